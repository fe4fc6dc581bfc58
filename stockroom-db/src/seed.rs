//! Demo data for manual testing of the fulfillment endpoints.
//!
//! Seeds one product, one warehouse and one open order placed an hour ago.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

use super::Result;

const DEMO_PRODUCT: &str = "Demo Widget";
const DEMO_WAREHOUSE: &str = "Demo Warehouse";

/// Ids created (or found) by [`seed_demo_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub product_id: i32,
    pub warehouse_id: i32,
    pub order_id: i32,
    pub amount: i32,
}

/// Seed demo rows if they don't exist.
///
/// Product and warehouse are looked up by name, so running this twice
/// reuses them. A new open order is added on every run.
pub async fn seed_demo_data(pool: &PgPool, amount: i32) -> Result<SeedSummary> {
    if amount <= 0 {
        return Err(anyhow::anyhow!("amount must be positive, got {}", amount));
    }

    let mut tx = pool.begin().await?;

    let existing_product: Option<i32> =
        sqlx::query_scalar("SELECT id_product FROM product WHERE name = $1 LIMIT 1")
            .bind(DEMO_PRODUCT)
            .fetch_optional(&mut *tx)
            .await?;

    let product_id = match existing_product {
        Some(id) => id,
        None => {
            sqlx::query_scalar(
                r#"
                INSERT INTO product (name, description, price)
                VALUES ($1, 'Seeded by stockroomd db seed', $2)
                RETURNING id_product
                "#,
            )
            .bind(DEMO_PRODUCT)
            .bind(Decimal::new(1999, 2))
            .fetch_one(&mut *tx)
            .await?
        },
    };

    let existing_warehouse: Option<i32> =
        sqlx::query_scalar("SELECT id_warehouse FROM warehouse WHERE name = $1 LIMIT 1")
            .bind(DEMO_WAREHOUSE)
            .fetch_optional(&mut *tx)
            .await?;

    let warehouse_id = match existing_warehouse {
        Some(id) => id,
        None => {
            sqlx::query_scalar(
                "INSERT INTO warehouse (name, address) VALUES ($1, 'Dock 1') RETURNING id_warehouse",
            )
            .bind(DEMO_WAREHOUSE)
            .fetch_one(&mut *tx)
            .await?
        },
    };

    let order_id: i32 = sqlx::query_scalar(
        r#"INSERT INTO "order" (id_product, amount, created_at) VALUES ($1, $2, $3) RETURNING id_order"#,
    )
    .bind(product_id)
    .bind(amount)
    .bind(Utc::now() - Duration::hours(1))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(product_id, warehouse_id, order_id, amount, "Demo data seeded");

    Ok(SeedSummary {
        product_id,
        warehouse_id,
        order_id,
        amount,
    })
}
