//! Stockroom Storage Layer
//!
//! Provides persistence for orders and inventory movements, and the
//! fulfillment workflow that runs against it.
//!
//! # Architecture
//!
//! - **Repository traits**: `Store` hands out a `UnitOfWork` (ports)
//! - **Workflow**: the fulfillment steps, written once against `UnitOfWork`
//! - **In-memory store**: Fast implementation for testing
//! - **PostgreSQL store**: Production implementation (feature `postgres`)
//!
//! # Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use stockroom_domain::FulfillmentRequest;
//! use stockroom_store::{fulfil_atomically, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     let product = store.add_product("Bolt").await.unwrap();
//!     let warehouse = store.add_warehouse("North").await.unwrap();
//!     let placed = Utc::now() - Duration::hours(1);
//!     store.add_order(product, 5, placed).await.unwrap();
//!
//!     let fulfillment = FulfillmentRequest {
//!         product_id: product.as_i32(),
//!         warehouse_id: warehouse.as_i32(),
//!         amount: 5,
//!         created_at: Utc::now(),
//!     }
//!     .validate()
//!     .unwrap();
//!
//!     let movement = fulfil_atomically(&store, &fulfillment).await.unwrap();
//!     println!("Movement recorded: {}", movement.id);
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod error;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;
mod repository;
mod workflow;

// Re-exports
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;
pub use repository::{Store, UnitOfWork};
pub use workflow::{fulfil, fulfil_atomically, WorkflowError};
