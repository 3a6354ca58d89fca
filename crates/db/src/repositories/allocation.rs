//! Allocation engine: turns a requested sale quantity into a sale item and
//! FIFO batch allocations in one transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, prelude::DateTimeWithTimeZone,
};
use stockwise_core::StockError;
use stockwise_core::allocation::{AllocationRequest, AllocationService, CandidateBatch};
use stockwise_core::ledger::LedgerService;
use stockwise_core::sale::{SaleLine, SaleTotals};
use uuid::Uuid;

use crate::entities::{product_variants, sale_item_batch_allocations, sale_items, sales, stock_batches};
use crate::error::db_err;
use crate::repositories::retry::with_retries;
use crate::repositories::stock_batch::write_level;
use crate::soft_delete::lock_active_shared;

/// Input for allocating a sale item.
#[derive(Debug, Clone)]
pub struct AllocateInput {
    /// Parent sale, must be active.
    pub sale_id: Uuid,
    /// Variant being sold, must be active.
    pub product_variant_id: Uuid,
    /// Units needed.
    pub quantity: i32,
    /// Unit price fixed at sale time.
    pub unit_price: Decimal,
}

/// Result of a committed allocation.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// The new sale item.
    pub sale_item: sale_items::Model,
    /// One row per touched batch, in FIFO order.
    pub allocations: Vec<sale_item_batch_allocations::Model>,
    /// Sale total after the item was added.
    pub sale_total: Decimal,
}

/// Allocation repository.
#[derive(Debug, Clone)]
pub struct AllocationRepository {
    db: DatabaseConnection,
    max_attempts: u32,
}

impl AllocationRepository {
    /// Creates a new allocation repository.
    ///
    /// `max_attempts` bounds how often a lost race is retried.
    #[must_use]
    pub const fn new(db: DatabaseConnection, max_attempts: u32) -> Self {
        Self { db, max_attempts }
    }

    /// Allocates `input.quantity` units FIFO and records the sale item.
    ///
    /// All-or-nothing: on any error no batch, sale or item row changes.
    ///
    /// # Errors
    ///
    /// `Validation`, `NotFound` (sale or variant), `InsufficientStock`,
    /// `PriceBelowMinimum`, or `ConcurrentModification` once retries are
    /// exhausted.
    pub async fn allocate(&self, input: &AllocateInput) -> Result<AllocationOutcome, StockError> {
        with_retries("allocate", self.max_attempts, || self.try_allocate(input)).await
    }

    async fn try_allocate(&self, input: &AllocateInput) -> Result<AllocationOutcome, StockError> {
        let request = AllocationRequest {
            quantity: input.quantity,
            unit_price: input.unit_price,
        };
        AllocationService::validate_request(&request)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        // Lock order: sale, then batches in FIFO order
        let sale = sales::Entity::find_by_id(input.sale_id)
            .filter(sales::Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("sale", input.sale_id))?;

        lock_active_shared::<product_variants::Entity, _>(&txn, input.product_variant_id).await?;

        let candidates = stock_batches::Entity::find()
            .filter(stock_batches::Column::ProductVariantId.eq(input.product_variant_id))
            .filter(stock_batches::Column::DeletedAt.is_null())
            .filter(stock_batches::Column::QuantityRemaining.gt(0))
            .order_by_asc(stock_batches::Column::ReceivedAt)
            .order_by_asc(stock_batches::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_err)?;

        let plan = AllocationService::plan(
            &request,
            candidates
                .iter()
                .map(|b| CandidateBatch {
                    batch_id: b.id,
                    received_at: b.received_at,
                    quantity_remaining: b.quantity_remaining,
                    min_sale_price_per_unit: b.min_sale_price_per_unit,
                })
                .collect(),
        )?;

        let sale_total = SaleTotals::after_addition(
            sale.total_amount,
            &SaleLine {
                quantity_sold: plan.quantity,
                price_at_sale: plan.unit_price,
            },
        )?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let sale_item = sale_items::ActiveModel {
            id: Set(Uuid::now_v7()),
            sale_id: Set(sale.id),
            product_variant_id: Set(input.product_variant_id),
            quantity_sold: Set(plan.quantity),
            price_at_sale: Set(plan.unit_price),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut allocations = Vec::with_capacity(plan.portions.len());
        for portion in &plan.portions {
            let level = candidates
                .iter()
                .find(|b| b.id == portion.batch_id)
                .map(stock_batches::Model::level)
                .ok_or_else(|| {
                    StockError::Internal(format!("planned batch {} was not locked", portion.batch_id))
                })?;
            LedgerService::check_level(&level)?;
            let next = LedgerService::decrement(level, portion.quantity)?;
            write_level(&txn, &level, &next, true).await?;

            let allocation = sale_item_batch_allocations::ActiveModel {
                id: Set(Uuid::now_v7()),
                sale_item_id: Set(sale_item.id),
                stock_batch_id: Set(portion.batch_id),
                quantity_from_batch: Set(portion.quantity),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
            allocations.push(allocation);
        }

        let updated = sales::Entity::update_many()
            .col_expr(sales::Column::TotalAmount, Expr::value(sale_total))
            .filter(sales::Column::Id.eq(sale.id))
            .filter(sales::Column::TotalAmount.eq(sale.total_amount))
            .filter(sales::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if updated.rows_affected == 0 {
            return Err(StockError::ConcurrentModification);
        }

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            sale_id = %sale.id,
            sale_item_id = %sale_item.id,
            quantity = plan.quantity,
            batches = allocations.len(),
            "sale item allocated"
        );

        Ok(AllocationOutcome {
            sale_item,
            allocations,
            sale_total,
        })
    }
}
