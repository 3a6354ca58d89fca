//! Read access to sale items and their allocations.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use stockwise_core::StockError;
use stockwise_shared::types::{ListQuery, PageResponse};
use uuid::Uuid;

use crate::entities::{sale_item_batch_allocations, sale_items};
use crate::error::db_err;
use crate::listing::fetch_page;

/// Filter for listing sale items.
#[derive(Debug, Clone, Default)]
pub struct SaleItemFilter {
    /// Only items of this sale.
    pub sale_id: Option<Uuid>,
    /// Only items of this variant.
    pub product_variant_id: Option<Uuid>,
}

/// A sale item with its allocation rows.
#[derive(Debug, Clone)]
pub struct SaleItemWithAllocations {
    /// The sale item.
    pub sale_item: sale_items::Model,
    /// Allocation rows, kept after reversal.
    pub allocations: Vec<sale_item_batch_allocations::Model>,
}

/// Sale item repository.
#[derive(Debug, Clone)]
pub struct SaleItemRepository {
    db: DatabaseConnection,
}

impl SaleItemRepository {
    /// Creates a new sale item repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a sale item and its allocations.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row exists.
    pub async fn find_by_id(&self, id: Uuid) -> Result<SaleItemWithAllocations, StockError> {
        let sale_item = sale_items::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("sale item", id))?;

        let allocations = sale_item_batch_allocations::Entity::find()
            .filter(sale_item_batch_allocations::Column::SaleItemId.eq(id))
            .order_by_asc(sale_item_batch_allocations::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(SaleItemWithAllocations {
            sale_item,
            allocations,
        })
    }

    /// Lists sale items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sort column is unknown.
    pub async fn list(
        &self,
        filter: &SaleItemFilter,
        query: &ListQuery,
    ) -> Result<PageResponse<sale_items::Model>, StockError> {
        let mut select = sale_items::Entity::find();
        if let Some(sale_id) = filter.sale_id {
            select = select.filter(sale_items::Column::SaleId.eq(sale_id));
        }
        if let Some(variant_id) = filter.product_variant_id {
            select = select.filter(sale_items::Column::ProductVariantId.eq(variant_id));
        }
        fetch_page(&self.db, select, query).await
    }
}
