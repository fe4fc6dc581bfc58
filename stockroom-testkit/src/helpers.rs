//! Test helper functions for database seeding.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use stockroom_domain::{Amount, InventoryMovement, Order, OrderId, ProductId, WarehouseId};

use anyhow::Result;

/// Everything needed to submit a fulfillment that will succeed.
#[derive(Debug, Clone, Copy)]
pub struct SeededOrder {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub order_id: OrderId,
    pub amount: i32,
    pub placed_at: DateTime<Utc>,
}

/// Insert a product and return its generated id.
pub async fn seed_product(pool: &PgPool, name: &str) -> Result<ProductId> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO product (name, description, price) VALUES ($1, $2, $3) RETURNING id_product",
    )
    .bind(name)
    .bind(format!("{} (test)", name))
    .bind(Decimal::new(2500, 2))
    .fetch_one(pool)
    .await?;

    Ok(ProductId::new(id)?)
}

/// Insert a warehouse and return its generated id.
pub async fn seed_warehouse(pool: &PgPool, name: &str) -> Result<WarehouseId> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO warehouse (name, address) VALUES ($1, $2) RETURNING id_warehouse",
    )
    .bind(name)
    .bind("Test Street 1")
    .fetch_one(pool)
    .await?;

    Ok(WarehouseId::new(id)?)
}

/// Insert an open order and return its generated id.
pub async fn seed_order(
    pool: &PgPool,
    product_id: ProductId,
    amount: i32,
    created_at: DateTime<Utc>,
) -> Result<OrderId> {
    let id: OrderId = sqlx::query_scalar(
        r#"INSERT INTO "order" (id_product, amount, created_at) VALUES ($1, $2, $3) RETURNING id_order"#,
    )
    .bind(product_id.as_i32())
    .bind(amount)
    .bind(created_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Seed one product, one warehouse and one open order placed a day ago.
pub async fn seed_fulfillable_order(pool: &PgPool, amount: i32) -> Result<SeededOrder> {
    let product_id = seed_product(pool, "Widget").await?;
    let warehouse_id = seed_warehouse(pool, "Central").await?;
    let placed_at = Utc::now() - Duration::days(1);
    let order_id = seed_order(pool, product_id, amount, placed_at).await?;

    Ok(SeededOrder {
        product_id,
        warehouse_id,
        order_id,
        amount,
        placed_at,
    })
}

/// Load an order by id.
pub async fn fetch_order(pool: &PgPool, order_id: OrderId) -> Result<Order> {
    let row = sqlx::query(
        r#"SELECT id_order, id_product, amount, created_at, fulfilled_at FROM "order" WHERE id_order = $1"#,
    )
    .bind(order_id)
    .fetch_one(pool)
    .await?;

    Ok(Order {
        id: row.try_get("id_order")?,
        product_id: ProductId::new(row.try_get("id_product")?)?,
        amount: Amount::new(row.try_get("amount")?)?,
        created_at: row.try_get("created_at")?,
        fulfilled_at: row.try_get("fulfilled_at")?,
    })
}

/// Load every movement that references the order.
pub async fn movements_for_order(
    pool: &PgPool,
    order_id: OrderId,
) -> Result<Vec<InventoryMovement>> {
    let rows = sqlx::query(
        r#"
        SELECT id_product_warehouse, id_warehouse, id_product, id_order, amount, price, created_at
        FROM product_warehouse
        WHERE id_order = $1
        ORDER BY id_product_warehouse
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    let mut movements = Vec::with_capacity(rows.len());
    for row in rows {
        movements.push(InventoryMovement {
            id: row.try_get("id_product_warehouse")?,
            warehouse_id: WarehouseId::new(row.try_get("id_warehouse")?)?,
            product_id: ProductId::new(row.try_get("id_product")?)?,
            order_id: row.try_get("id_order")?,
            amount: Amount::new(row.try_get("amount")?)?,
            price: row.try_get("price")?,
            created_at: row.try_get("created_at")?,
        });
    }

    Ok(movements)
}
