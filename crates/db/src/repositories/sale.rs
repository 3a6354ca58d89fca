//! Sale repository.
//!
//! `total_amount` is never written here; it moves only through allocation
//! and reversal.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use stockwise_core::StockError;
use stockwise_shared::types::{ListQuery, PageResponse};
use uuid::Uuid;

use crate::entities::sales;
use crate::error::db_err;
use crate::listing::fetch_page;
use crate::soft_delete;

/// Input for creating a sale.
#[derive(Debug, Clone, Default)]
pub struct CreateSaleInput {
    /// Customer name.
    pub customer_name: Option<String>,
    /// Customer phone.
    pub customer_phone: Option<String>,
    /// Customer email.
    pub customer_email: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// User recording the sale.
    pub created_by: Option<Uuid>,
}

/// Metadata changes for a sale. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct UpdateSaleInput {
    /// Customer name.
    pub customer_name: Option<String>,
    /// Customer phone.
    pub customer_phone: Option<String>,
    /// Customer email.
    pub customer_email: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Sale repository.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    db: DatabaseConnection,
}

impl SaleRepository {
    /// Creates a new sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens an empty sale with a zero total.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(&self, input: CreateSaleInput) -> Result<sales::Model, StockError> {
        let now = Utc::now().into();
        let sale = sales::ActiveModel {
            id: Set(Uuid::now_v7()),
            total_amount: Set(Decimal::ZERO),
            customer_name: Set(input.customer_name),
            customer_phone: Set(input.customer_phone),
            customer_email: Set(input.customer_email),
            notes: Set(input.notes),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        tracing::info!(sale_id = %sale.id, "sale opened");
        Ok(sale)
    }

    /// Finds a sale by ID, deleted or not.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row exists.
    pub async fn find_by_id(&self, id: Uuid) -> Result<sales::Model, StockError> {
        sales::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("sale", id))
    }

    /// Lists sales.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sort column is unknown.
    pub async fn list(&self, query: &ListQuery) -> Result<PageResponse<sales::Model>, StockError> {
        fetch_page(&self.db, sales::Entity::find(), query).await
    }

    /// Updates customer metadata of an active sale.
    ///
    /// # Errors
    ///
    /// `NotFound` when the sale is missing or deleted.
    pub async fn update(&self, id: Uuid, input: UpdateSaleInput) -> Result<sales::Model, StockError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let sale = sales::Entity::find_by_id(id)
            .filter(sales::Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("sale", id))?;

        let mut active: sales::ActiveModel = sale.into();
        if let Some(name) = input.customer_name {
            active.customer_name = Set(Some(name));
        }
        if let Some(phone) = input.customer_phone {
            active.customer_phone = Set(Some(phone));
        }
        if let Some(email) = input.customer_email {
            active.customer_email = Set(Some(email));
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now().into());

        let sale = active.update(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(sale)
    }

    /// Soft-deletes a sale with no active items.
    ///
    /// # Errors
    ///
    /// `HasActiveDependents` while any item is active, `AlreadyDeleted`,
    /// `NotFound`.
    pub async fn delete(&self, id: Uuid) -> Result<sales::Model, StockError> {
        soft_delete::soft_delete::<sales::Entity>(&self.db, id).await
    }

    /// Restores a soft-deleted sale.
    ///
    /// # Errors
    ///
    /// `NotDeleted`, `NotFound`.
    pub async fn restore(&self, id: Uuid) -> Result<sales::Model, StockError> {
        soft_delete::restore::<sales::Entity>(&self.db, id).await
    }
}
