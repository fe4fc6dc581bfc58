//! Test doubles shared by the service and API tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroom_domain::{
    Fulfillment, MovementId, NewInventoryMovement, Order, OrderId, ProductId, WarehouseId,
};
use stockroom_store::{MemoryStore, Store, StoreError, UnitOfWork};

/// Which step a `FaultyStore` unit of work should break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The order update touches no rows
    Update,
    /// The movement insert returns no id
    Insert,
    /// A movement already references the matched order
    MovementExists,
    /// The store drops the connection while matching
    Unavailable,
}

/// Memory store whose units of work break one workflow step.
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fault: Fault,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore, fault: Fault) -> Self {
        Self { inner, fault }
    }
}

struct FaultyUnitOfWork {
    inner: Box<dyn UnitOfWork>,
    fault: Fault,
}

fn connection_lost() -> StoreError {
    StoreError::Connection("connection reset by peer".to_string())
}

#[async_trait]
impl UnitOfWork for FaultyUnitOfWork {
    async fn product_exists(&mut self, id: ProductId) -> Result<bool, StoreError> {
        self.inner.product_exists(id).await
    }

    async fn warehouse_exists(&mut self, id: WarehouseId) -> Result<bool, StoreError> {
        self.inner.warehouse_exists(id).await
    }

    async fn lock_matching_order(
        &mut self,
        fulfillment: &Fulfillment,
    ) -> Result<Option<Order>, StoreError> {
        if self.fault == Fault::Unavailable {
            return Err(connection_lost());
        }
        self.inner.lock_matching_order(fulfillment).await
    }

    async fn movement_exists_for_order(&mut self, order_id: OrderId) -> Result<bool, StoreError> {
        if self.fault == Fault::MovementExists {
            return Ok(true);
        }
        self.inner.movement_exists_for_order(order_id).await
    }

    async fn clock(&mut self) -> Result<DateTime<Utc>, StoreError> {
        self.inner.clock().await
    }

    async fn mark_order_fulfilled(
        &mut self,
        order_id: OrderId,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        if self.fault == Fault::Update {
            return Ok(0);
        }
        self.inner.mark_order_fulfilled(order_id, at).await
    }

    async fn insert_movement(
        &mut self,
        movement: &NewInventoryMovement,
    ) -> Result<Option<MovementId>, StoreError> {
        if self.fault == Fault::Insert {
            return Ok(None);
        }
        self.inner.insert_movement(movement).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.rollback().await
    }
}

#[async_trait]
impl Store for FaultyStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        Ok(Box::new(FaultyUnitOfWork {
            inner: self.inner.begin().await?,
            fault: self.fault,
        }))
    }

    async fn add_product_to_warehouse(
        &self,
        fulfillment: &Fulfillment,
    ) -> Result<Option<MovementId>, StoreError> {
        match self.fault {
            Fault::Insert => Ok(None),
            Fault::Unavailable => Err(connection_lost()),
            Fault::Update | Fault::MovementExists => {
                self.inner.add_product_to_warehouse(fulfillment).await
            },
        }
    }
}
