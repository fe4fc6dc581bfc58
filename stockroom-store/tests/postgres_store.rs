//! Integration tests for the PostgreSQL store.
//!
//! Run with: `cargo test -p stockroom-store --features postgres`

#![cfg(feature = "postgres")]

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use stockroom_domain::{Fulfillment, FulfillmentRequest, Rejection};
use stockroom_store::{fulfil, fulfil_atomically, PgStore, Store, StoreError, WorkflowError};
use stockroom_testkit::{fetch_order, movements_for_order, seed_fulfillable_order, SeededOrder};

fn fulfillment_for(seeded: &SeededOrder) -> Fulfillment {
    FulfillmentRequest {
        product_id: seeded.product_id.as_i32(),
        warehouse_id: seeded.warehouse_id.as_i32(),
        amount: seeded.amount,
        created_at: Utc::now(),
    }
    .validate()
    .expect("seeded request is valid")
}

#[sqlx::test(migrations = "../migrations")]
async fn test_fulfil_atomically_commits_movement(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 20).await.unwrap();
    let store = PgStore::new(pool.clone());

    let movement = fulfil_atomically(&store, &fulfillment_for(&seeded))
        .await
        .expect("fulfillment should succeed");

    let order = fetch_order(&pool, seeded.order_id).await.unwrap();
    assert!(order.fulfilled_at.is_some());

    let movements = movements_for_order(&pool, seeded.order_id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].id, movement.id);
    assert_eq!(movements[0].price, dec!(400));
    assert_eq!(movements[0].warehouse_id, seeded.warehouse_id);
}

#[sqlx::test(migrations = "../migrations")]
async fn test_created_at_equal_to_order_does_not_match(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 5).await.unwrap();
    let store = PgStore::new(pool.clone());

    let mut fulfillment = fulfillment_for(&seeded);
    fulfillment.created_at = seeded.placed_at;

    let err = fulfil_atomically(&store, &fulfillment).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Rejected(Rejection::NoMatchingOrder { .. })));

    fulfillment.created_at = seeded.placed_at - Duration::seconds(1);
    let err = fulfil_atomically(&store, &fulfillment).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Rejected(Rejection::NoMatchingOrder { .. })));
}

#[sqlx::test(migrations = "../migrations")]
async fn test_rollback_discards_order_update(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 3).await.unwrap();
    let store = PgStore::new(pool.clone());

    let mut uow = store.begin().await.unwrap();
    fulfil(uow.as_mut(), &fulfillment_for(&seeded))
        .await
        .unwrap();
    uow.rollback().await.unwrap();

    let order = fetch_order(&pool, seeded.order_id).await.unwrap();
    assert!(order.fulfilled_at.is_none());
    assert!(movements_for_order(&pool, seeded.order_id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../migrations")]
async fn test_concurrent_fulfillments_produce_one_movement(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 7).await.unwrap();
    let store = PgStore::new(pool.clone());
    let fulfillment = fulfillment_for(&seeded);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            fulfil_atomically(&store, &fulfillment).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(WorkflowError::Rejected(_)) => {},
            Err(other) => panic!("Unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(movements_for_order(&pool, seeded.order_id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../migrations")]
async fn test_procedure_returns_new_id(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 20).await.unwrap();
    let store = PgStore::new(pool.clone());

    let new_id = store
        .add_product_to_warehouse(&fulfillment_for(&seeded))
        .await
        .unwrap()
        .expect("procedure should return an id");

    let movements = movements_for_order(&pool, seeded.order_id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].id, new_id);
    assert_eq!(movements[0].price, dec!(400));
}

#[sqlx::test(migrations = "../migrations")]
async fn test_procedure_raises_for_unknown_warehouse(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 20).await.unwrap();
    let store = PgStore::new(pool.clone());

    let mut fulfillment = fulfillment_for(&seeded);
    fulfillment.warehouse_id = stockroom_domain::WarehouseId::new(9999).unwrap();

    let err = store.add_product_to_warehouse(&fulfillment).await.unwrap_err();
    match err {
        StoreError::Raised(message) => assert_eq!(message, "Warehouse 9999 does not exist"),
        other => panic!("Expected raised error, got {:?}", other),
    }
}

#[sqlx::test(migrations = "../migrations")]
async fn test_procedure_second_call_is_rejected(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 4).await.unwrap();
    let store = PgStore::new(pool.clone());
    let fulfillment = fulfillment_for(&seeded);

    store.add_product_to_warehouse(&fulfillment).await.unwrap();
    let err = store.add_product_to_warehouse(&fulfillment).await.unwrap_err();

    assert!(matches!(err, StoreError::Raised(_)));
    assert_eq!(movements_for_order(&pool, seeded.order_id).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../migrations")]
async fn test_order_and_movement_share_database_time(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 6).await.unwrap();
    let store = PgStore::new(pool.clone());

    let movement = fulfil_atomically(&store, &fulfillment_for(&seeded))
        .await
        .unwrap();

    let order = fetch_order(&pool, seeded.order_id).await.unwrap();
    assert_eq!(order.fulfilled_at, Some(movement.created_at));
}

#[sqlx::test(migrations = "../migrations")]
async fn test_procedure_stamps_order_and_movement_alike(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 6).await.unwrap();
    let store = PgStore::new(pool.clone());

    store
        .add_product_to_warehouse(&fulfillment_for(&seeded))
        .await
        .unwrap();

    let order = fetch_order(&pool, seeded.order_id).await.unwrap();
    let movements = movements_for_order(&pool, seeded.order_id).await.unwrap();
    assert_eq!(order.fulfilled_at, Some(movements[0].created_at));
}

#[sqlx::test(migrations = "../migrations")]
async fn test_key_collision_is_a_database_error(pool: sqlx::PgPool) {
    let seeded = seed_fulfillable_order(&pool, 6).await.unwrap();

    let err = sqlx::query("INSERT INTO product (id_product, name) VALUES ($1, 'Clone')")
        .bind(seeded.product_id.as_i32())
        .execute(&pool)
        .await
        .unwrap_err();

    assert!(matches!(StoreError::from(err), StoreError::Database(_)));
}
