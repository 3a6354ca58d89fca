//! Reversal of sale items: restores batch quantities and the sale total,
//! then marks the item deleted. Allocation rows are kept.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::DateTimeWithTimeZone,
};
use stockwise_core::StockError;
use stockwise_core::ledger::LedgerService;
use stockwise_core::reversal::{BatchRestoration, RecordedAllocation, ReversalInput, ReversalService};
use stockwise_core::sale::{SaleLine, SaleTotals};
use uuid::Uuid;

use crate::entities::{sale_item_batch_allocations, sale_items, sales, stock_batches};
use crate::error::db_err;
use crate::repositories::retry::with_retries;
use crate::repositories::stock_batch::write_level;
use crate::soft_delete::lock_row;

/// Result of a committed reversal.
#[derive(Debug, Clone)]
pub struct ReversalOutcome {
    /// The sale item, now deleted.
    pub sale_item: sale_items::Model,
    /// Units returned per batch.
    pub restorations: Vec<BatchRestoration>,
    /// Sale total after the item was removed.
    pub sale_total: Decimal,
}

/// Reversal repository.
#[derive(Debug, Clone)]
pub struct ReversalRepository {
    db: DatabaseConnection,
    max_attempts: u32,
}

impl ReversalRepository {
    /// Creates a new reversal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, max_attempts: u32) -> Self {
        Self { db, max_attempts }
    }

    /// Reverses a sale item.
    ///
    /// # Errors
    ///
    /// `NotFound` when no sale item row exists, `AlreadyReversed` when it is
    /// already deleted. Any failure leaves batches, sale and item untouched.
    pub async fn reverse(&self, sale_item_id: Uuid) -> Result<ReversalOutcome, StockError> {
        with_retries("reverse", self.max_attempts, || self.try_reverse(sale_item_id)).await
    }

    async fn try_reverse(&self, sale_item_id: Uuid) -> Result<ReversalOutcome, StockError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let item = lock_row::<sale_items::Entity, _>(&txn, sale_item_id).await?;
        ReversalService::ensure_reversible(&item)?;

        let recorded = sale_item_batch_allocations::Entity::find()
            .filter(sale_item_batch_allocations::Column::SaleItemId.eq(item.id))
            .all(&txn)
            .await
            .map_err(db_err)?;

        let plan = ReversalService::plan(&ReversalInput {
            sale_item_id: item.id,
            quantity_sold: item.quantity_sold,
            price_at_sale: item.price_at_sale,
            allocations: recorded
                .iter()
                .map(|a| RecordedAllocation {
                    batch_id: a.stock_batch_id,
                    quantity_from_batch: a.quantity_from_batch,
                })
                .collect(),
        })?;

        // Same lock order as allocation: sale, then batches in FIFO order
        let sale = sales::Entity::find_by_id(item.sale_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::Internal(format!("sale {} missing", item.sale_id)))?;

        let locked = stock_batches::Entity::find()
            .filter(
                stock_batches::Column::Id
                    .is_in(plan.restorations.iter().map(|r| r.batch_id).collect::<Vec<_>>()),
            )
            .order_by_asc(stock_batches::Column::ReceivedAt)
            .order_by_asc(stock_batches::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_err)?;

        let sale_total = SaleTotals::after_removal(
            sale.total_amount,
            &SaleLine {
                quantity_sold: item.quantity_sold,
                price_at_sale: item.price_at_sale,
            },
        )?;

        // Deleted batches are restored too
        for restoration in &plan.restorations {
            let level = locked
                .iter()
                .find(|b| b.id == restoration.batch_id)
                .map(stock_batches::Model::level)
                .ok_or_else(|| {
                    StockError::Internal(format!(
                        "batch {} of sale item {} missing",
                        restoration.batch_id, item.id
                    ))
                })?;
            LedgerService::check_level(&level)?;
            let next = LedgerService::increment(level, restoration.quantity)?;
            write_level(&txn, &level, &next, false).await?;
        }

        let updated = sales::Entity::update_many()
            .col_expr(sales::Column::TotalAmount, Expr::value(sale_total))
            .filter(sales::Column::Id.eq(sale.id))
            .filter(sales::Column::TotalAmount.eq(sale.total_amount))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if updated.rows_affected == 0 {
            return Err(StockError::ConcurrentModification);
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let updated = sale_items::Entity::update_many()
            .col_expr(sale_items::Column::DeletedAt, Expr::value(now))
            .filter(sale_items::Column::Id.eq(item.id))
            .filter(sale_items::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if updated.rows_affected == 0 {
            return Err(StockError::ConcurrentModification);
        }

        let sale_item = lock_row::<sale_items::Entity, _>(&txn, item.id).await?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            sale_id = %sale.id,
            sale_item_id = %sale_item.id,
            batches = plan.restorations.len(),
            amount = %plan.total_decrement,
            "sale item reversed"
        );

        Ok(ReversalOutcome {
            sale_item,
            restorations: plan.restorations,
            sale_total,
        })
    }
}
