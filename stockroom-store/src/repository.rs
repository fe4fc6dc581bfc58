//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the fulfillment workflow.
//! Implementations can be PostgreSQL, in-memory, or mock for testing.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stockroom_domain::{
    Fulfillment, MovementId, NewInventoryMovement, Order, OrderId, ProductId, WarehouseId,
};

/// One transactional scope.
///
/// Every read and write of a single fulfillment attempt goes through the
/// same unit of work. Dropping it without calling `commit` discards all
/// writes.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Check whether a product row exists
    async fn product_exists(&mut self, id: ProductId) -> Result<bool, StoreError>;

    /// Check whether a warehouse row exists
    async fn warehouse_exists(&mut self, id: WarehouseId) -> Result<bool, StoreError>;

    /// Find the oldest open order matching the fulfillment that no movement
    /// references yet, and lock it for the rest of this unit of work
    async fn lock_matching_order(
        &mut self,
        fulfillment: &Fulfillment,
    ) -> Result<Option<Order>, StoreError>;

    /// Check whether any movement references the order
    async fn movement_exists_for_order(&mut self, order_id: OrderId) -> Result<bool, StoreError>;

    /// Current time according to the store; stamps the order and movement
    async fn clock(&mut self) -> Result<DateTime<Utc>, StoreError>;

    /// Set `fulfilled_at` on an open order; returns the number of rows changed
    async fn mark_order_fulfilled(
        &mut self,
        order_id: OrderId,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Insert a movement; returns the generated id, if the store produced one
    async fn insert_movement(
        &mut self,
        movement: &NewInventoryMovement,
    ) -> Result<Option<MovementId>, StoreError>;

    /// Make all writes visible
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Discard all writes
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Combined store interface
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a new unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    /// Run the server-side `add_product_to_warehouse` procedure.
    ///
    /// Business rule violations come back as `StoreError::Raised`.
    /// `Ok(None)` means the procedure finished without producing an id.
    async fn add_product_to_warehouse(
        &self,
        fulfillment: &Fulfillment,
    ) -> Result<Option<MovementId>, StoreError>;

    /// Check connectivity
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(()) // Default no-op for stores without a connection
    }
}
