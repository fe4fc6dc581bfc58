//! The order-fulfillment workflow.
//!
//! Steps, all inside one unit of work:
//!
//! 1. Product exists
//! 2. Warehouse exists
//! 3. Lock the matching open order
//! 4. No movement references it yet
//! 5. Mark it fulfilled
//! 6. Insert the inventory movement
//!
//! Both writes are stamped with the store's clock, read once per attempt.

use stockroom_domain::{
    Fulfillment, InventoryMovement, NewInventoryMovement, OrderId, Rejection,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::repository::{Store, UnitOfWork};

/// Why a fulfillment attempt did not produce a movement.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Business rule rejected the fulfillment
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The order update touched no rows
    #[error("Failed to mark order {0} as fulfilled")]
    UpdateFailed(OrderId),

    /// The movement insert returned no id
    #[error("Failed to insert inventory movement for order {0}")]
    InsertFailed(OrderId),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Run every fulfillment step against an open unit of work.
///
/// Does not commit; the caller owns the transactional scope.
pub async fn fulfil(
    uow: &mut dyn UnitOfWork,
    fulfillment: &Fulfillment,
) -> Result<InventoryMovement, WorkflowError> {
    if !uow.product_exists(fulfillment.product_id).await? {
        return Err(Rejection::ProductNotFound(fulfillment.product_id).into());
    }

    if !uow.warehouse_exists(fulfillment.warehouse_id).await? {
        return Err(Rejection::WarehouseNotFound(fulfillment.warehouse_id).into());
    }

    let order = uow.lock_matching_order(fulfillment).await?.ok_or(
        Rejection::NoMatchingOrder {
            product_id: fulfillment.product_id,
            amount: fulfillment.amount,
        },
    )?;
    debug!(order_id = order.id, "Matched open order");

    // Guard against a movement written outside this workflow.
    if uow.movement_exists_for_order(order.id).await? {
        return Err(Rejection::AlreadyFulfilled(order.id).into());
    }

    let now = uow.clock().await?;
    if uow.mark_order_fulfilled(order.id, now).await? == 0 {
        return Err(WorkflowError::UpdateFailed(order.id));
    }

    let movement = NewInventoryMovement::for_order(fulfillment, &order, now);
    let id = uow
        .insert_movement(&movement)
        .await?
        .ok_or(WorkflowError::InsertFailed(order.id))?;

    Ok(movement.with_id(id))
}

/// Run [`fulfil`] in a fresh unit of work, committing on success and rolling
/// back on every other path.
pub async fn fulfil_atomically<S>(
    store: &S,
    fulfillment: &Fulfillment,
) -> Result<InventoryMovement, WorkflowError>
where
    S: Store + ?Sized,
{
    let mut uow = store.begin().await?;

    match fulfil(uow.as_mut(), fulfillment).await {
        Ok(movement) => {
            uow.commit().await?;
            Ok(movement)
        },
        Err(e) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!(error = %rollback_err, "Rollback failed after fulfillment error");
            }
            Err(e)
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use stockroom_domain::FulfillmentRequest;

    struct Fixture {
        store: MemoryStore,
        fulfillment: Fulfillment,
        order_id: OrderId,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let product = store.add_product("Bolt M8").await.unwrap();
        let warehouse = store.add_warehouse("Gdansk").await.unwrap();
        let placed = Utc::now() - Duration::days(1);
        let order_id = store.add_order(product, 20, placed).await.unwrap();

        let fulfillment = FulfillmentRequest {
            product_id: product.as_i32(),
            warehouse_id: warehouse.as_i32(),
            amount: 20,
            created_at: Utc::now(),
        }
        .validate()
        .unwrap();

        Fixture {
            store,
            fulfillment,
            order_id,
        }
    }

    #[tokio::test]
    async fn test_fulfil_records_movement_and_closes_order() {
        let fx = fixture().await;
        let before = Utc::now();

        let movement = fulfil_atomically(&fx.store, &fx.fulfillment).await.unwrap();

        assert_eq!(movement.order_id, fx.order_id);
        assert_eq!(movement.price, dec!(400));
        assert!(movement.created_at >= before);
        assert!(movement.created_at <= Utc::now());

        let order = fx.store.order(fx.order_id).await.unwrap();
        assert_eq!(order.fulfilled_at, Some(movement.created_at));
        assert_eq!(fx.store.movement_count().await, 1);
    }

    #[tokio::test]
    async fn test_fulfil_without_commit_leaves_store_untouched() {
        let fx = fixture().await;

        let mut uow = fx.store.begin().await.unwrap();
        fulfil(uow.as_mut(), &fx.fulfillment).await.unwrap();
        drop(uow);

        assert!(fx.store.order(fx.order_id).await.unwrap().is_open());
        assert_eq!(fx.store.movement_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_warehouse_is_rejected() {
        let mut fx = fixture().await;
        fx.fulfillment.warehouse_id = stockroom_domain::WarehouseId::new(999).unwrap();

        let err = fulfil_atomically(&fx.store, &fx.fulfillment)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Rejected(Rejection::WarehouseNotFound(_))));
    }

    #[tokio::test]
    async fn test_second_attempt_finds_no_open_order() {
        let fx = fixture().await;
        fulfil_atomically(&fx.store, &fx.fulfillment).await.unwrap();

        let err = fulfil_atomically(&fx.store, &fx.fulfillment)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Rejected(Rejection::NoMatchingOrder { .. })));
        assert_eq!(fx.store.movement_count().await, 1);
    }
}
