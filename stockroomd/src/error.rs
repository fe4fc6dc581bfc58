//! Daemon error types.

use stockroom_domain::{DomainError, OrderId, Rejection};
use stockroom_store::{StoreError, WorkflowError};
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Request failed field validation
    #[error("Invalid request: {0}")]
    Validation(#[from] DomainError),

    /// Fulfillment rejected by a business rule
    #[error("{0}")]
    Rejected(#[from] Rejection),

    /// Business rule raised by the stored procedure
    #[error("{0}")]
    ProcedureRejected(String),

    /// Matched order could not be marked fulfilled
    #[error("Failed to mark order {0} as fulfilled")]
    UpdateFailed(OrderId),

    /// No identity came back for the new movement
    #[error("Failed to insert inventory movement: {0}")]
    InsertFailed(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<WorkflowError> for DaemonError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Rejected(rejection) => DaemonError::Rejected(rejection),
            WorkflowError::UpdateFailed(order_id) => DaemonError::UpdateFailed(order_id),
            WorkflowError::InsertFailed(order_id) => {
                DaemonError::InsertFailed(format!("no id returned for order {}", order_id))
            },
            WorkflowError::Store(e) => DaemonError::Store(e),
        }
    }
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
