//! PostgreSQL store.
//!
//! This module provides:
//! - `PgStore`, the `Store` adapter over a `PgPool`
//! - `PgUnitOfWork`, one database transaction per fulfillment attempt
//!
//! This module uses dynamic queries (sqlx::query) instead of compile-time
//! checked macros (sqlx::query!) to allow compilation without DATABASE_URL.

use crate::error::StoreError;
use crate::repository::{Store, UnitOfWork};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use stockroom_domain::{
    Amount, Fulfillment, MovementId, NewInventoryMovement, Order, OrderId, ProductId,
    WarehouseId,
};
use tracing::debug;

/// PostgreSQL adapter for the fulfillment tables.
#[derive(Clone)]
pub struct PgStore {
    /// PostgreSQL connection pool
    pool: PgPool,
}

impl PgStore {
    /// Create a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool (for testing).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Helper function to parse a row from the `"order"` table.
fn parse_order_row(row: &sqlx::postgres::PgRow) -> Result<Order, StoreError> {
    let product_id: i32 = row.try_get("id_product")?;
    let amount: i32 = row.try_get("amount")?;

    Ok(Order {
        id: row.try_get("id_order")?,
        product_id: ProductId::new(product_id)?,
        amount: Amount::new(amount)?,
        created_at: row.try_get("created_at")?,
        fulfilled_at: row.try_get("fulfilled_at")?,
    })
}

// =============================================================================
// Unit of work
// =============================================================================

/// A fulfillment attempt's database transaction.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn product_exists(&mut self, id: ProductId) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM product WHERE id_product = $1)")
                .bind(id.as_i32())
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(exists)
    }

    async fn warehouse_exists(&mut self, id: WarehouseId) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM warehouse WHERE id_warehouse = $1)")
                .bind(id.as_i32())
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(exists)
    }

    /// Locks the candidate row with `FOR UPDATE`. A concurrent attempt on the
    /// same order waits here; once the holder commits, PostgreSQL re-checks
    /// `fulfilled_at IS NULL` against the new row version and drops it.
    async fn lock_matching_order(
        &mut self,
        fulfillment: &Fulfillment,
    ) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT o.id_order, o.id_product, o.amount, o.created_at, o.fulfilled_at
            FROM "order" o
            WHERE o.id_product = $1
              AND o.amount = $2
              AND o.created_at < $3
              AND o.fulfilled_at IS NULL
              AND NOT EXISTS (
                  SELECT 1 FROM product_warehouse pw WHERE pw.id_order = o.id_order
              )
            ORDER BY o.created_at ASC, o.id_order ASC
            LIMIT 1
            FOR UPDATE OF o
            "#,
        )
        .bind(fulfillment.product_id.as_i32())
        .bind(fulfillment.amount.as_i32())
        .bind(fulfillment.created_at)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(parse_order_row).transpose()
    }

    async fn movement_exists_for_order(&mut self, order_id: OrderId) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM product_warehouse WHERE id_order = $1)",
        )
        .bind(order_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    /// Transaction start time, the same instant `now()` gives inside the
    /// `add_product_to_warehouse` procedure.
    async fn clock(&mut self) -> Result<DateTime<Utc>, StoreError> {
        let now: DateTime<Utc> = sqlx::query_scalar("SELECT now()")
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(now)
    }

    async fn mark_order_fulfilled(
        &mut self,
        order_id: OrderId,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"UPDATE "order" SET fulfilled_at = $2 WHERE id_order = $1 AND fulfilled_at IS NULL"#,
        )
        .bind(order_id)
        .bind(at)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_movement(
        &mut self,
        movement: &NewInventoryMovement,
    ) -> Result<Option<MovementId>, StoreError> {
        let id: Option<MovementId> = sqlx::query_scalar(
            r#"
            INSERT INTO product_warehouse (
                id_warehouse, id_product, id_order, amount, price, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id_product_warehouse
            "#,
        )
        .bind(movement.warehouse_id.as_i32())
        .bind(movement.product_id.as_i32())
        .bind(movement.order_id)
        .bind(movement.amount.as_i32())
        .bind(movement.price)
        .bind(movement.created_at)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

// =============================================================================
// Store Implementation
// =============================================================================

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn add_product_to_warehouse(
        &self,
        fulfillment: &Fulfillment,
    ) -> Result<Option<MovementId>, StoreError> {
        let row = sqlx::query("CALL add_product_to_warehouse($1, $2, $3, $4, NULL)")
            .bind(fulfillment.product_id.as_i32())
            .bind(fulfillment.warehouse_id.as_i32())
            .bind(fulfillment.amount.as_i32())
            .bind(fulfillment.created_at)
            .fetch_one(&self.pool)
            .await?;

        let new_id: Option<MovementId> = row.try_get("new_id")?;
        debug!(?new_id, "add_product_to_warehouse returned");
        Ok(new_id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(())
    }
}
