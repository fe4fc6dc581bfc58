//! HTTP API for the Stockroom daemon.
//!
//! Provides REST endpoints for:
//! - Health check
//! - Fulfilling an order in application code
//! - Fulfilling an order through the stored procedure

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use stockroom_domain::{FulfillmentRequest, MovementId};
use stockroom_store::Store;

use crate::error::DaemonError;
use crate::fulfillment::FulfillmentService;

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState<S: Store + ?Sized + 'static> {
    pub fulfillment: FulfillmentService<S>,
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Id of the inventory movement a fulfillment created.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResponse {
    pub id_product_warehouse: MovementId,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router<S>(state: Arc<ApiState<S>>) -> Router
where
    S: Store + ?Sized + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/warehouse", post(fulfil_handler))
        .route("/api/warehouse/add-via-proc", post(fulfil_via_proc_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler<S>(State(state): State<Arc<ApiState<S>>>) -> Json<HealthResponse>
where
    S: Store + ?Sized + 'static,
{
    let status = match state.fulfillment.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            warn!(error = %e, "Store ping failed");
            "degraded"
        },
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fulfil the oldest matching order.
async fn fulfil_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    payload: Result<Json<FulfillmentRequest>, JsonRejection>,
) -> Result<Json<FulfillmentResponse>, ApiError>
where
    S: Store + ?Sized + 'static,
{
    let Json(request) = payload.map_err(rejection_response)?;

    let id = state
        .fulfillment
        .submit(&request)
        .await
        .map_err(to_error_response)?;

    Ok(Json(FulfillmentResponse {
        id_product_warehouse: id,
    }))
}

/// Fulfil through `add_product_to_warehouse`.
async fn fulfil_via_proc_handler<S>(
    State(state): State<Arc<ApiState<S>>>,
    payload: Result<Json<FulfillmentRequest>, JsonRejection>,
) -> Result<Json<FulfillmentResponse>, ApiError>
where
    S: Store + ?Sized + 'static,
{
    let Json(request) = payload.map_err(rejection_response)?;

    let id = state
        .fulfillment
        .submit_via_procedure(&request)
        .await
        .map_err(to_error_response)?;

    Ok(Json(FulfillmentResponse {
        id_product_warehouse: id,
    }))
}

// =============================================================================
// Helpers
// =============================================================================

fn to_error_response(error: DaemonError) -> ApiError {
    use stockroom_domain::Rejection;

    let status = match &error {
        DaemonError::Validation(_) | DaemonError::ProcedureRejected(_) => StatusCode::BAD_REQUEST,
        DaemonError::Rejected(Rejection::ProductNotFound(_))
        | DaemonError::Rejected(Rejection::WarehouseNotFound(_)) => StatusCode::NOT_FOUND,
        DaemonError::Rejected(_) => StatusCode::BAD_REQUEST,
        DaemonError::UpdateFailed(_)
        | DaemonError::InsertFailed(_)
        | DaemonError::Store(_)
        | DaemonError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn rejection_response(rejection: JsonRejection) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: format!("Invalid request body: {}", rejection.body_text()),
        }),
    )
}

// =============================================================================
// Tests
// =============================================================================
