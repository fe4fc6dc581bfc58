//! In-memory store implementation
//!
//! Used for testing and development without a database.
//! A unit of work holds the table lock for its whole lifetime and writes to
//! a staged copy, so concurrent units of work are serialised and an
//! uncommitted one leaves no trace.

use crate::error::StoreError;
use crate::repository::{Store, UnitOfWork};
use crate::workflow::{fulfil_atomically, WorkflowError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use stockroom_domain::{
    Amount, Fulfillment, InventoryMovement, MovementId, NewInventoryMovement, Order, OrderId,
    Product, ProductId, Warehouse, WarehouseId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Table contents
#[derive(Debug, Clone, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    warehouses: BTreeMap<WarehouseId, Warehouse>,
    orders: BTreeMap<OrderId, Order>,
    movements: BTreeMap<MovementId, InventoryMovement>,
    last_product_id: i32,
    last_warehouse_id: i32,
    last_order_id: OrderId,
    last_movement_id: MovementId,
}

impl Tables {
    fn order_has_movement(&self, order_id: OrderId) -> bool {
        self.movements.values().any(|m| m.order_id == order_id)
    }
}

/// In-memory store for testing
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product and return its id
    pub async fn add_product(&self, name: &str) -> Result<ProductId, StoreError> {
        let mut tables = self.tables.lock().await;
        let id = ProductId::new(tables.last_product_id + 1)?;
        tables.last_product_id = id.as_i32();
        tables.products.insert(
            id,
            Product {
                id,
                name: name.to_string(),
                description: String::new(),
                price: Decimal::ZERO,
            },
        );
        Ok(id)
    }

    /// Insert a warehouse and return its id
    pub async fn add_warehouse(&self, name: &str) -> Result<WarehouseId, StoreError> {
        let mut tables = self.tables.lock().await;
        let id = WarehouseId::new(tables.last_warehouse_id + 1)?;
        tables.last_warehouse_id = id.as_i32();
        tables.warehouses.insert(
            id,
            Warehouse {
                id,
                name: name.to_string(),
                address: String::new(),
            },
        );
        Ok(id)
    }

    /// Insert an open order and return its id
    pub async fn add_order(
        &self,
        product_id: ProductId,
        amount: i32,
        created_at: DateTime<Utc>,
    ) -> Result<OrderId, StoreError> {
        let amount = Amount::new(amount)?;
        let mut tables = self.tables.lock().await;
        if !tables.products.contains_key(&product_id) {
            return Err(StoreError::not_found("product", product_id.to_string()));
        }
        tables.last_order_id += 1;
        let id = tables.last_order_id;
        tables.orders.insert(
            id,
            Order {
                id,
                product_id,
                amount,
                created_at,
                fulfilled_at: None,
            },
        );
        Ok(id)
    }

    /// Insert a movement directly, bypassing the workflow
    pub async fn add_movement(&self, movement: NewInventoryMovement) -> MovementId {
        let mut tables = self.tables.lock().await;
        tables.last_movement_id += 1;
        let id = tables.last_movement_id;
        tables.movements.insert(id, movement.with_id(id));
        id
    }

    /// Get an order by id
    pub async fn order(&self, id: OrderId) -> Option<Order> {
        self.tables.lock().await.orders.get(&id).cloned()
    }

    /// Get all movements in id order
    pub async fn movements(&self) -> Vec<InventoryMovement> {
        self.tables.lock().await.movements.values().cloned().collect()
    }

    /// Get the number of movements
    pub async fn movement_count(&self) -> usize {
        self.tables.lock().await.movements.len()
    }
}

// =============================================================================
// Unit of work
// =============================================================================

/// Exclusive, staged view of the tables
struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn product_exists(&mut self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.staged.products.contains_key(&id))
    }

    async fn warehouse_exists(&mut self, id: WarehouseId) -> Result<bool, StoreError> {
        Ok(self.staged.warehouses.contains_key(&id))
    }

    async fn lock_matching_order(
        &mut self,
        fulfillment: &Fulfillment,
    ) -> Result<Option<Order>, StoreError> {
        let tables = &self.staged;
        Ok(tables
            .orders
            .values()
            .filter(|o| o.matches(fulfillment) && !tables.order_has_movement(o.id))
            .min_by_key(|o| (o.created_at, o.id))
            .cloned())
    }

    async fn movement_exists_for_order(&mut self, order_id: OrderId) -> Result<bool, StoreError> {
        Ok(self.staged.order_has_movement(order_id))
    }

    async fn clock(&mut self) -> Result<DateTime<Utc>, StoreError> {
        Ok(Utc::now())
    }

    async fn mark_order_fulfilled(
        &mut self,
        order_id: OrderId,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        match self.staged.orders.get_mut(&order_id) {
            Some(order) if order.is_open() => {
                order.mark_fulfilled(at)?;
                Ok(1)
            },
            _ => Ok(0),
        }
    }

    async fn insert_movement(
        &mut self,
        movement: &NewInventoryMovement,
    ) -> Result<Option<MovementId>, StoreError> {
        self.staged.last_movement_id += 1;
        let id = self.staged.last_movement_id;
        self.staged.movements.insert(id, movement.clone().with_id(id));
        Ok(Some(id))
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(()) // Staged copy is dropped with the guard
    }
}

// =============================================================================
// Store Implementation
// =============================================================================

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, staged }))
    }

    /// Emulates the server-side procedure with the Rust workflow, reporting
    /// business rejections the way PL/pgSQL `RAISE EXCEPTION` would.
    async fn add_product_to_warehouse(
        &self,
        fulfillment: &Fulfillment,
    ) -> Result<Option<MovementId>, StoreError> {
        match fulfil_atomically(self, fulfillment).await {
            Ok(movement) => Ok(Some(movement.id)),
            Err(WorkflowError::Rejected(rejection)) => {
                debug!(%rejection, "Procedure raised");
                Err(StoreError::Raised(rejection.to_string()))
            },
            Err(WorkflowError::InsertFailed(_)) => Ok(None),
            Err(e @ WorkflowError::UpdateFailed(_)) => Err(StoreError::Database(e.to_string())),
            Err(WorkflowError::Store(e)) => Err(e),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stockroom_domain::FulfillmentRequest;

    #[tokio::test]
    async fn test_add_order_requires_product() {
        let store = MemoryStore::new();
        let missing = ProductId::new(5).unwrap();

        let err = store.add_order(missing, 1, Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_identities_are_sequential() {
        let store = MemoryStore::new();
        assert_eq!(store.add_product("a").await.unwrap().as_i32(), 1);
        assert_eq!(store.add_product("b").await.unwrap().as_i32(), 2);
        assert_eq!(store.add_warehouse("w").await.unwrap().as_i32(), 1);
    }

    #[tokio::test]
    async fn test_lock_matching_order_picks_oldest() {
        let store = MemoryStore::new();
        let product = store.add_product("Bolt").await.unwrap();
        let warehouse = store.add_warehouse("North").await.unwrap();
        let now = Utc::now();
        let newer = store.add_order(product, 3, now - Duration::hours(1)).await.unwrap();
        let older = store.add_order(product, 3, now - Duration::hours(5)).await.unwrap();

        let fulfillment = FulfillmentRequest {
            product_id: product.as_i32(),
            warehouse_id: warehouse.as_i32(),
            amount: 3,
            created_at: now,
        }
        .validate()
        .unwrap();

        let mut uow = store.begin().await.unwrap();
        let order = uow.lock_matching_order(&fulfillment).await.unwrap().unwrap();
        assert_eq!(order.id, older);
        assert_ne!(order.id, newer);
    }

    #[tokio::test]
    async fn test_order_with_existing_movement_is_skipped() {
        let store = MemoryStore::new();
        let product = store.add_product("Bolt").await.unwrap();
        let warehouse = store.add_warehouse("North").await.unwrap();
        let placed = Utc::now() - Duration::hours(1);
        let order_id = store.add_order(product, 3, placed).await.unwrap();

        let fulfillment = FulfillmentRequest {
            product_id: product.as_i32(),
            warehouse_id: warehouse.as_i32(),
            amount: 3,
            created_at: Utc::now(),
        }
        .validate()
        .unwrap();
        let order = store.order(order_id).await.unwrap();
        store
            .add_movement(NewInventoryMovement::for_order(&fulfillment, &order, Utc::now()))
            .await;

        let mut uow = store.begin().await.unwrap();
        assert!(uow.movement_exists_for_order(order_id).await.unwrap());
        assert!(uow.lock_matching_order(&fulfillment).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_fulfilled_twice_changes_nothing() {
        let store = MemoryStore::new();
        let product = store.add_product("Bolt").await.unwrap();
        let order_id = store.add_order(product, 3, Utc::now()).await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert_eq!(uow.mark_order_fulfilled(order_id, Utc::now()).await.unwrap(), 1);
        assert_eq!(uow.mark_order_fulfilled(order_id, Utc::now()).await.unwrap(), 0);
        assert_eq!(uow.mark_order_fulfilled(404, Utc::now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_commit_publishes_staged_writes() {
        let store = MemoryStore::new();
        let product = store.add_product("Bolt").await.unwrap();
        let order_id = store.add_order(product, 3, Utc::now()).await.unwrap();

        let mut uow = store.begin().await.unwrap();
        uow.mark_order_fulfilled(order_id, Utc::now()).await.unwrap();
        uow.commit().await.unwrap();

        assert!(!store.order(order_id).await.unwrap().is_open());
    }

    #[tokio::test]
    async fn test_procedure_reports_rejection_as_raised() {
        let store = MemoryStore::new();
        let fulfillment = FulfillmentRequest {
            product_id: 7,
            warehouse_id: 1,
            amount: 3,
            created_at: Utc::now(),
        }
        .validate()
        .unwrap();

        let err = store.add_product_to_warehouse(&fulfillment).await.unwrap_err();
        match err {
            StoreError::Raised(message) => assert_eq!(message, "Product 7 does not exist"),
            other => panic!("Expected raised error, got {:?}", other),
        }
    }
}
