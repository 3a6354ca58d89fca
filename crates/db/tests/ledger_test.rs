//! Integration tests for FIFO allocation and reversal against PostgreSQL.

#![allow(clippy::uninlined_format_args)]

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use stockwise_core::StockError;
use stockwise_db::entities::stock_batches;
use stockwise_db::repositories::{AllocateInput, SaleItemFilter};
use stockwise_db::{
    AllocationRepository, ReversalRepository, SaleItemRepository, SaleRepository,
    StockBatchRepository,
};
use stockwise_shared::types::ListQuery;
use tokio::sync::Barrier;
use uuid::Uuid;

use common::{connect, create_batch, create_sale, create_variant, remaining};

const MAX_RETRIES: u32 = 3;

#[tokio::test]
async fn test_fifo_allocation_spans_oldest_batches_first() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    // Received out of order on purpose
    let b2 = create_batch(&db, variant.id, 10, "2026-01-02T09:00:00Z").await;
    let b1 = create_batch(&db, variant.id, 3, "2026-01-01T09:00:00Z").await;
    let sale = create_sale(&db).await;

    let outcome = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 5,
            unit_price: dec!(12.00),
        })
        .await
        .expect("allocation should succeed");

    let by_batch: HashMap<_, _> = outcome
        .allocations
        .iter()
        .map(|a| (a.stock_batch_id, a.quantity_from_batch))
        .collect();
    assert_eq!(by_batch.len(), 2);
    assert_eq!(by_batch[&b1.id], 3);
    assert_eq!(by_batch[&b2.id], 2);

    assert_eq!(remaining(&db, b1.id).await, 0);
    assert_eq!(remaining(&db, b2.id).await, 8);
    assert_eq!(outcome.sale_item.quantity_sold, 5);
    assert_eq!(outcome.sale_total, dec!(60.00));
}

#[tokio::test]
async fn test_allocate_then_reverse_restores_ledger() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let batch = create_batch(&db, variant.id, 10, "2026-02-01T09:00:00Z").await;
    let sale = create_sale(&db).await;

    let outcome = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 4,
            unit_price: dec!(11.50),
        })
        .await
        .expect("allocation should succeed");
    assert_eq!(remaining(&db, batch.id).await, 6);
    assert_eq!(outcome.sale_total, dec!(46.00));

    let reversal = ReversalRepository::new(db.clone(), MAX_RETRIES)
        .reverse(outcome.sale_item.id)
        .await
        .expect("reversal should succeed");

    assert_eq!(remaining(&db, batch.id).await, 10);
    assert_eq!(reversal.sale_total, Decimal::ZERO);
    assert!(reversal.sale_item.deleted_at.is_some());
    assert_eq!(reversal.restorations.len(), 1);
    assert_eq!(reversal.restorations[0].quantity, 4);

    let sale = SaleRepository::new(db.clone())
        .find_by_id(sale.id)
        .await
        .expect("find sale");
    assert_eq!(sale.total_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_insufficient_stock_leaves_ledger_unchanged() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let batch = create_batch(&db, variant.id, 3, "2026-03-01T09:00:00Z").await;
    let sale = create_sale(&db).await;

    let err = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 5,
            unit_price: dec!(12.00),
        })
        .await
        .expect_err("over-allocation must fail");

    assert!(matches!(
        err,
        StockError::InsufficientStock {
            requested: 5,
            available: 3
        }
    ));
    assert_eq!(remaining(&db, batch.id).await, 3);

    let items = SaleItemRepository::new(db.clone())
        .list(
            &SaleItemFilter {
                sale_id: Some(sale.id),
                product_variant_id: None,
            },
            &ListQuery::default(),
        )
        .await
        .expect("list sale items");
    assert_eq!(items.meta.total, 0);
}

#[tokio::test]
async fn test_price_below_batch_minimum_is_rejected() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let batch = create_batch(&db, variant.id, 5, "2026-03-02T09:00:00Z").await;
    let sale = create_sale(&db).await;

    let err = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 1,
            unit_price: dec!(9.99),
        })
        .await
        .expect_err("price below floor must fail");

    assert!(matches!(err, StockError::PriceBelowMinimum { batch_id, .. } if batch_id == batch.id));
    assert_eq!(remaining(&db, batch.id).await, 5);
}

#[tokio::test]
async fn test_double_reversal_is_rejected() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let batch = create_batch(&db, variant.id, 8, "2026-04-01T09:00:00Z").await;
    let sale = create_sale(&db).await;

    let outcome = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 2,
            unit_price: dec!(12.00),
        })
        .await
        .expect("allocation should succeed");

    let reversals = ReversalRepository::new(db.clone(), MAX_RETRIES);
    reversals
        .reverse(outcome.sale_item.id)
        .await
        .expect("first reversal should succeed");

    let err = reversals
        .reverse(outcome.sale_item.id)
        .await
        .expect_err("second reversal must fail");
    assert!(matches!(err, StockError::AlreadyReversed(id) if id == outcome.sale_item.id));
    assert_eq!(remaining(&db, batch.id).await, 8);
}

#[tokio::test]
async fn test_sale_delete_blocked_by_active_item() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    create_batch(&db, variant.id, 5, "2026-05-01T09:00:00Z").await;
    let sale = create_sale(&db).await;
    let sales = SaleRepository::new(db.clone());

    let outcome = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 1,
            unit_price: dec!(12.00),
        })
        .await
        .expect("allocation should succeed");

    let err = sales.delete(sale.id).await.expect_err("delete must be blocked");
    assert!(matches!(err, StockError::HasActiveDependents { count: 1, .. }));
    assert!(err.is_state_error());

    ReversalRepository::new(db.clone(), MAX_RETRIES)
        .reverse(outcome.sale_item.id)
        .await
        .expect("reversal should succeed");

    let deleted = sales.delete(sale.id).await.expect("delete should succeed");
    assert!(deleted.deleted_at.is_some());

    let err = sales.delete(sale.id).await.expect_err("already deleted");
    assert!(matches!(err, StockError::AlreadyDeleted { .. }));

    let restored = sales.restore(sale.id).await.expect("restore should succeed");
    assert!(restored.deleted_at.is_none());
}

#[tokio::test]
async fn test_allocation_skips_deleted_batches() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let old = create_batch(&db, variant.id, 5, "2026-06-01T09:00:00Z").await;
    let newer = create_batch(&db, variant.id, 5, "2026-06-02T09:00:00Z").await;
    let sale = create_sale(&db).await;

    StockBatchRepository::new(db.clone())
        .delete(old.id)
        .await
        .expect("delete batch");

    let outcome = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 2,
            unit_price: dec!(12.00),
        })
        .await
        .expect("allocation should succeed");

    assert_eq!(outcome.allocations.len(), 1);
    assert_eq!(outcome.allocations[0].stock_batch_id, newer.id);
    assert_eq!(remaining(&db, old.id).await, 5);
    assert_eq!(remaining(&db, newer.id).await, 3);
}

#[tokio::test]
async fn test_allocation_on_deleted_sale_is_not_found() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    create_batch(&db, variant.id, 5, "2026-06-03T09:00:00Z").await;
    let sale = create_sale(&db).await;
    SaleRepository::new(db.clone())
        .delete(sale.id)
        .await
        .expect("delete empty sale");

    let err = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 1,
            unit_price: dec!(12.00),
        })
        .await
        .expect_err("deleted sale");
    assert!(matches!(err, StockError::NotFound { entity: "sale", .. }));
}

#[tokio::test]
async fn test_quantity_received_is_immutable() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let batch = create_batch(&db, variant.id, 5, "2026-07-01T09:00:00Z").await;

    let mut active: stock_batches::ActiveModel = batch.into();
    active.quantity_received = Set(50);
    let result = active.update(&db).await;

    assert!(result.is_err(), "trigger must reject quantity_received changes");
}

#[tokio::test]
async fn test_concurrent_allocations_never_oversell() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let batch = create_batch(&db, variant.id, 10, "2026-08-01T09:00:00Z").await;

    const NUM_TASKS: usize = 15;
    let mut sale_ids = Vec::with_capacity(NUM_TASKS);
    for _ in 0..NUM_TASKS {
        sale_ids.push(create_sale(&db).await.id);
    }

    let repo = AllocationRepository::new(db.clone(), MAX_RETRIES);
    let barrier = Arc::new(Barrier::new(NUM_TASKS));

    let handles = sale_ids.into_iter().map(|sale_id| {
        let repo = repo.clone();
        let barrier = Arc::clone(&barrier);
        let variant_id = variant.id;
        tokio::spawn(async move {
            barrier.wait().await;
            repo.allocate(&AllocateInput {
                sale_id,
                product_variant_id: variant_id,
                quantity: 1,
                unit_price: dec!(12.00),
            })
            .await
        })
    });

    let mut successes = 0;
    for result in join_all(handles).await {
        match result.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(StockError::InsufficientStock { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 10);
    assert_eq!(remaining(&db, batch.id).await, 0);
}

async fn assert_total_matches_active_items(db: &DatabaseConnection, sale_id: Uuid) {
    let sale = SaleRepository::new(db.clone())
        .find_by_id(sale_id)
        .await
        .expect("find sale");
    let items = SaleItemRepository::new(db.clone())
        .list(
            &SaleItemFilter {
                sale_id: Some(sale_id),
                product_variant_id: None,
            },
            &ListQuery::default(),
        )
        .await
        .expect("list sale items");
    let expected: Decimal = items
        .data
        .iter()
        .map(|item| Decimal::from(item.quantity_sold) * item.price_at_sale)
        .sum();
    assert_eq!(sale.total_amount, expected);
}

#[tokio::test]
async fn test_four_decimal_price_round_trips() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let batch = create_batch(&db, variant.id, 10, "2026-09-01T09:00:00Z").await;
    let sale = create_sale(&db).await;

    let outcome = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 3,
            unit_price: dec!(12.0001),
        })
        .await
        .expect("allocation should succeed");
    assert_eq!(outcome.sale_item.price_at_sale, dec!(12.0001));
    assert_eq!(outcome.sale_total, dec!(36.0003));
    assert_total_matches_active_items(&db, sale.id).await;

    let reversal = ReversalRepository::new(db.clone(), MAX_RETRIES)
        .reverse(outcome.sale_item.id)
        .await
        .expect("reversal should succeed");
    assert_eq!(reversal.sale_total, Decimal::ZERO);
    assert_eq!(remaining(&db, batch.id).await, 10);
    assert_total_matches_active_items(&db, sale.id).await;
}

#[tokio::test]
async fn test_unit_price_finer_than_storage_is_rejected() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let batch = create_batch(&db, variant.id, 10, "2026-09-02T09:00:00Z").await;
    let sale = create_sale(&db).await;
    let repo = AllocationRepository::new(db.clone(), MAX_RETRIES);

    for unit_price in [dec!(12.00005), Decimal::MAX] {
        let err = repo
            .allocate(&AllocateInput {
                sale_id: sale.id,
                product_variant_id: variant.id,
                quantity: 3,
                unit_price,
            })
            .await
            .expect_err("unstorable price must fail");
        assert!(matches!(err, StockError::Validation(_)), "{unit_price}: {err}");
    }

    assert_eq!(remaining(&db, batch.id).await, 10);
    assert_total_matches_active_items(&db, sale.id).await;
}

#[tokio::test]
async fn test_reversal_restores_into_deleted_batch() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    let batch = create_batch(&db, variant.id, 6, "2026-09-03T09:00:00Z").await;
    let sale = create_sale(&db).await;
    let batches = StockBatchRepository::new(db.clone());

    let outcome = AllocationRepository::new(db.clone(), MAX_RETRIES)
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 4,
            unit_price: dec!(12.00),
        })
        .await
        .expect("allocation should succeed");
    batches.delete(batch.id).await.expect("delete batch");

    ReversalRepository::new(db.clone(), MAX_RETRIES)
        .reverse(outcome.sale_item.id)
        .await
        .expect("reversal should succeed");

    let after = batches.find_by_id(batch.id).await.expect("find batch");
    assert_eq!(after.quantity_remaining, 6);
    assert!(after.deleted_at.is_some(), "batch stays deleted");
}

#[tokio::test]
async fn test_sale_total_tracks_active_items() {
    let Some(db) = connect().await else { return };
    let variant = create_variant(&db).await;
    create_batch(&db, variant.id, 4, "2026-09-04T09:00:00Z").await;
    create_batch(&db, variant.id, 20, "2026-09-05T09:00:00Z").await;
    let sale = create_sale(&db).await;
    let allocations = AllocationRepository::new(db.clone(), MAX_RETRIES);
    let reversals = ReversalRepository::new(db.clone(), MAX_RETRIES);

    let mut item_ids = Vec::new();
    for (quantity, unit_price) in [(3, dec!(12.25)), (2, dec!(10.0001)), (5, dec!(15.5))] {
        let outcome = allocations
            .allocate(&AllocateInput {
                sale_id: sale.id,
                product_variant_id: variant.id,
                quantity,
                unit_price,
            })
            .await
            .expect("allocation should succeed");
        item_ids.push(outcome.sale_item.id);
        assert_total_matches_active_items(&db, sale.id).await;
    }

    reversals
        .reverse(item_ids[1])
        .await
        .expect("reversal should succeed");
    assert_total_matches_active_items(&db, sale.id).await;

    let outcome = allocations
        .allocate(&AllocateInput {
            sale_id: sale.id,
            product_variant_id: variant.id,
            quantity: 1,
            unit_price: dec!(11.1111),
        })
        .await
        .expect("allocation should succeed");
    assert_total_matches_active_items(&db, sale.id).await;
    // 3 * 12.25 + 5 * 15.5 + 11.1111
    assert_eq!(outcome.sale_total, dec!(125.3611));

    for id in [item_ids[0], item_ids[2], outcome.sale_item.id] {
        reversals.reverse(id).await.expect("reversal should succeed");
        assert_total_matches_active_items(&db, sale.id).await;
    }
    let sale = SaleRepository::new(db.clone())
        .find_by_id(sale.id)
        .await
        .expect("find sale");
    assert_eq!(sale.total_amount, Decimal::ZERO);
}
