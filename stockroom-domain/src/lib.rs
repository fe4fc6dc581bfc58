//! Stockroom Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains identifiers, entities, request validation and the
//! fulfillment rules (order matching, movement pricing).

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod entities;
pub mod fulfillment;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{
    InventoryMovement, MovementId, NewInventoryMovement, Order, OrderId, Product, Warehouse,
};
pub use fulfillment::{movement_price, Fulfillment, FulfillmentRequest, Rejection};
pub use value_objects::{Amount, DomainError, ProductId, WarehouseId};
