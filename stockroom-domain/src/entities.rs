//! Domain Entities for Stockroom
//!
//! Orders, inventory movements and the reference rows they point at.

use crate::fulfillment::{movement_price, Fulfillment};
use crate::value_objects::{Amount, DomainError, ProductId, WarehouseId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Database identity of an Order
pub type OrderId = i32;

/// Database identity of an InventoryMovement (`product_warehouse` row)
pub type MovementId = i32;

// =============================================================================
// Reference entities
// =============================================================================

/// A product that can be ordered and stocked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// A warehouse that receives stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub address: String,
}

// =============================================================================
// Order
// =============================================================================

/// Order represents a demand for a product quantity placed at `created_at`.
///
/// Orders are created outside this service. The only transition applied
/// here is open (`fulfilled_at == None`) to fulfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Check if the order is still open
    pub fn is_open(&self) -> bool {
        self.fulfilled_at.is_none()
    }

    /// Check whether this order can satisfy the given fulfillment.
    ///
    /// Product and amount must be equal and the order must have been
    /// placed strictly before the fulfillment timestamp. Whether a
    /// movement already references the order is a storage concern and
    /// is not checked here.
    pub fn matches(&self, fulfillment: &Fulfillment) -> bool {
        self.is_open()
            && self.product_id == fulfillment.product_id
            && self.amount == fulfillment.amount
            && self.created_at < fulfillment.created_at
    }

    /// Transition the order to fulfilled
    ///
    /// # Errors
    /// Returns `DomainError::InvalidStateTransition` if already fulfilled
    pub fn mark_fulfilled(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(previous) = self.fulfilled_at {
            return Err(DomainError::InvalidStateTransition(format!(
                "order {} already fulfilled at {}",
                self.id, previous
            )));
        }
        self.fulfilled_at = Some(at);
        Ok(())
    }
}

// =============================================================================
// Inventory movement
// =============================================================================

/// A persisted stock movement into a warehouse, satisfying one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub id: MovementId,
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub order_id: OrderId,
    pub amount: Amount,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// An inventory movement that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInventoryMovement {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub order_id: OrderId,
    pub amount: Amount,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl NewInventoryMovement {
    /// Build the movement recording `order` being satisfied by `fulfillment`.
    pub fn for_order(fulfillment: &Fulfillment, order: &Order, now: DateTime<Utc>) -> Self {
        Self {
            warehouse_id: fulfillment.warehouse_id,
            product_id: fulfillment.product_id,
            order_id: order.id,
            amount: fulfillment.amount,
            price: movement_price(fulfillment.amount, order.amount),
            created_at: now,
        }
    }

    /// Attach the identity assigned by the store
    pub fn with_id(self, id: MovementId) -> InventoryMovement {
        InventoryMovement {
            id,
            warehouse_id: self.warehouse_id,
            product_id: self.product_id,
            order_id: self.order_id,
            amount: self.amount,
            price: self.price,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
