//! Stockroom Daemon Library
//!
//! HTTP service that fulfils product orders by recording inventory
//! movements into warehouses.
//!
//! # Architecture
//!
//! ```text
//! HTTP client → API → FulfillmentService → workflow → UnitOfWork → Store
//!                                        ↘ add_product_to_warehouse (procedure)
//! ```
//!
//! # Components
//!
//! - **Daemon**: Opens the store and serves the API
//! - **FulfillmentService**: Validates requests and runs them against the store
//! - **API**: HTTP endpoints
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use stockroomd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let daemon = Daemon::from_config(config).await.expect("Failed to open store");
//!     daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
#[cfg(feature = "postgres")]
pub mod db;
pub mod error;
pub mod fulfillment;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::{ApiConfig, Config, DatabaseConfig, Environment};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use fulfillment::FulfillmentService;
