//! Test helpers for Stockroom database-backed tests.
//!
//! Provides seeding helpers for products, warehouses and orders, and
//! readers for asserting on fulfillment results.

mod helpers;

pub use helpers::{
    fetch_order, movements_for_order, seed_fulfillable_order, seed_order, seed_product,
    seed_warehouse, SeededOrder,
};
