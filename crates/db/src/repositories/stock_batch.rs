//! Stock batch repository.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use stockwise_core::StockError;
use stockwise_core::ledger::{BatchLevel, LedgerService, NewStockBatch};
use stockwise_shared::types::{ListQuery, PageResponse};
use uuid::Uuid;

use crate::entities::{product_variants, stock_batches, suppliers};
use crate::error::db_err;
use crate::listing::fetch_page;
use crate::soft_delete::{self, lock_active_shared};

/// Filter for listing stock batches.
#[derive(Debug, Clone, Default)]
pub struct StockBatchFilter {
    /// Only batches of this variant.
    pub product_variant_id: Option<Uuid>,
    /// Only batches from this supplier.
    pub supplier_id: Option<Uuid>,
}

/// Stock batch repository.
#[derive(Debug, Clone)]
pub struct StockBatchRepository {
    db: DatabaseConnection,
}

impl StockBatchRepository {
    /// Creates a new stock batch repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Receives a new batch with `quantity_remaining = quantity_received`.
    ///
    /// # Errors
    ///
    /// `Validation` for bad quantities or prices, `NotFound` when the variant
    /// or supplier is missing or deleted.
    pub async fn create(&self, input: NewStockBatch) -> Result<stock_batches::Model, StockError> {
        LedgerService::validate_new_batch(&input)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        lock_active_shared::<product_variants::Entity, _>(&txn, input.product_variant_id).await?;
        if let Some(supplier_id) = input.supplier_id {
            lock_active_shared::<suppliers::Entity, _>(&txn, supplier_id).await?;
        }

        let now = Utc::now().into();
        let batch = stock_batches::ActiveModel {
            id: Set(Uuid::now_v7()),
            product_variant_id: Set(input.product_variant_id),
            supplier_id: Set(input.supplier_id),
            quantity_received: Set(input.quantity_received),
            quantity_remaining: Set(input.quantity_received),
            buy_price_per_unit: Set(input.buy_price_per_unit),
            sell_price_per_unit: Set(input.sell_price_per_unit),
            min_sale_price_per_unit: Set(input.min_sale_price_per_unit),
            received_at: Set(input.received_at),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            batch_id = %batch.id,
            product_variant_id = %batch.product_variant_id,
            quantity = batch.quantity_received,
            "stock batch received"
        );
        Ok(batch)
    }

    /// Finds a batch by ID, deleted or not.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row exists.
    pub async fn find_by_id(&self, id: Uuid) -> Result<stock_batches::Model, StockError> {
        stock_batches::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("stock batch", id))
    }

    /// Lists batches.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sort column is unknown.
    pub async fn list(
        &self,
        filter: &StockBatchFilter,
        query: &ListQuery,
    ) -> Result<PageResponse<stock_batches::Model>, StockError> {
        let mut select = stock_batches::Entity::find();
        if let Some(variant_id) = filter.product_variant_id {
            select = select.filter(stock_batches::Column::ProductVariantId.eq(variant_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            select = select.filter(stock_batches::Column::SupplierId.eq(supplier_id));
        }
        fetch_page(&self.db, select, query).await
    }

    /// Soft-deletes a batch. Allocations are not reversed.
    ///
    /// # Errors
    ///
    /// `NotFound` or `AlreadyDeleted`.
    pub async fn delete(&self, id: Uuid) -> Result<stock_batches::Model, StockError> {
        soft_delete::soft_delete::<stock_batches::Entity>(&self.db, id).await
    }

    /// Restores a soft-deleted batch.
    ///
    /// # Errors
    ///
    /// `NotFound` or `NotDeleted`.
    pub async fn restore(&self, id: Uuid) -> Result<stock_batches::Model, StockError> {
        soft_delete::restore::<stock_batches::Entity>(&self.db, id).await
    }
}

/// Moves a locked batch from `from` to `to`.
///
/// The write only lands while the row still holds `from.quantity_remaining`
/// (and is active when `active_only`), otherwise `ConcurrentModification`.
pub(crate) async fn write_level<C: ConnectionTrait>(
    conn: &C,
    from: &BatchLevel,
    to: &BatchLevel,
    active_only: bool,
) -> Result<(), StockError> {
    LedgerService::check_level(to)?;

    let mut update = stock_batches::Entity::update_many()
        .col_expr(
            stock_batches::Column::QuantityRemaining,
            Expr::value(to.quantity_remaining),
        )
        .filter(stock_batches::Column::Id.eq(from.batch_id))
        .filter(stock_batches::Column::QuantityRemaining.eq(from.quantity_remaining));
    if active_only {
        update = update.filter(stock_batches::Column::DeletedAt.is_null());
    }

    let result = update.exec(conn).await.map_err(db_err)?;
    if result.rows_affected == 0 {
        tracing::debug!(batch_id = %from.batch_id, "batch changed under ledger write");
        return Err(StockError::ConcurrentModification);
    }
    Ok(())
}
