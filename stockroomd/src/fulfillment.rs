//! Fulfillment service: the two entry points behind the warehouse API.
//!
//! `submit` runs the workflow in a unit of work owned by this process.
//! `submit_via_procedure` hands the whole operation to the store's
//! `add_product_to_warehouse` procedure.

use std::sync::Arc;

use tracing::{error, info, warn};

use stockroom_domain::{Fulfillment, FulfillmentRequest, MovementId};
use stockroom_store::{fulfil_atomically, Store, StoreError};

use crate::error::{DaemonError, DaemonResult};

/// Records fulfillments against a store.
pub struct FulfillmentService<S: Store + ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> FulfillmentService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validate the request, then fulfil the oldest matching order.
    ///
    /// Returns the id of the new inventory movement.
    pub async fn submit(&self, request: &FulfillmentRequest) -> DaemonResult<MovementId> {
        let fulfillment = Self::validate(request)?;

        match fulfil_atomically(self.store.as_ref(), &fulfillment).await {
            Ok(movement) => {
                info!(
                    movement_id = movement.id,
                    order_id = movement.order_id,
                    product_id = %movement.product_id,
                    warehouse_id = %movement.warehouse_id,
                    price = %movement.price,
                    "Order fulfilled"
                );
                Ok(movement.id)
            },
            Err(e) => Err(Self::report(e.into(), &fulfillment)),
        }
    }

    /// Validate the request, then delegate to the stored procedure.
    pub async fn submit_via_procedure(
        &self,
        request: &FulfillmentRequest,
    ) -> DaemonResult<MovementId> {
        let fulfillment = Self::validate(request)?;

        let outcome = match self.store.add_product_to_warehouse(&fulfillment).await {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(DaemonError::InsertFailed(
                "procedure returned no id".to_string(),
            )),
            Err(StoreError::Raised(message)) => Err(DaemonError::ProcedureRejected(message)),
            Err(e) => Err(DaemonError::Store(e)),
        };

        match outcome {
            Ok(id) => {
                info!(
                    movement_id = id,
                    product_id = %fulfillment.product_id,
                    warehouse_id = %fulfillment.warehouse_id,
                    "Order fulfilled via procedure"
                );
                Ok(id)
            },
            Err(e) => Err(Self::report(e, &fulfillment)),
        }
    }

    /// Check that the store is reachable.
    pub async fn ping(&self) -> DaemonResult<()> {
        self.store.ping().await?;
        Ok(())
    }

    fn validate(request: &FulfillmentRequest) -> DaemonResult<Fulfillment> {
        request.validate().map_err(|e| {
            warn!(error = %e, "Rejected invalid fulfillment request");
            DaemonError::from(e)
        })
    }

    fn report(err: DaemonError, fulfillment: &Fulfillment) -> DaemonError {
        match &err {
            DaemonError::Rejected(_) | DaemonError::ProcedureRejected(_) => warn!(
                product_id = %fulfillment.product_id,
                warehouse_id = %fulfillment.warehouse_id,
                amount = %fulfillment.amount,
                reason = %err,
                "Fulfillment rejected"
            ),
            _ => error!(
                product_id = %fulfillment.product_id,
                warehouse_id = %fulfillment.warehouse_id,
                error = %err,
                "Fulfillment failed"
            ),
        }
        err
    }
}

// =============================================================================
// Tests
// =============================================================================
