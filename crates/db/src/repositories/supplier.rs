//! Supplier repository.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use stockwise_core::StockError;
use stockwise_shared::types::{ListQuery, PageResponse};
use uuid::Uuid;

use crate::entities::suppliers;
use crate::error::db_err;
use crate::listing::fetch_page;
use crate::soft_delete;

/// Input for creating a supplier.
#[derive(Debug, Clone)]
pub struct CreateSupplierInput {
    /// Supplier name.
    pub name: String,
    /// Contact person.
    pub contact_name: Option<String>,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Contact phone.
    pub contact_phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// Supplier repository.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    db: DatabaseConnection,
}

impl SupplierRepository {
    /// Creates a new supplier repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a supplier.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty name.
    pub async fn create(&self, input: CreateSupplierInput) -> Result<suppliers::Model, StockError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StockError::Validation("supplier name is required".to_string()));
        }

        let now = Utc::now().into();
        suppliers::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            contact_name: Set(input.contact_name),
            contact_email: Set(input.contact_email),
            contact_phone: Set(input.contact_phone),
            address: Set(input.address),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)
    }

    /// Finds a supplier by ID, deleted or not.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row exists.
    pub async fn find_by_id(&self, id: Uuid) -> Result<suppliers::Model, StockError> {
        suppliers::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("supplier", id))
    }

    /// Lists suppliers.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sort column is unknown.
    pub async fn list(&self, query: &ListQuery) -> Result<PageResponse<suppliers::Model>, StockError> {
        fetch_page(&self.db, suppliers::Entity::find(), query).await
    }

    /// Soft-deletes a supplier with no active stock batches.
    ///
    /// # Errors
    ///
    /// `HasActiveDependents`, `AlreadyDeleted`, `NotFound`.
    pub async fn delete(&self, id: Uuid) -> Result<suppliers::Model, StockError> {
        soft_delete::soft_delete::<suppliers::Entity>(&self.db, id).await
    }

    /// Restores a soft-deleted supplier.
    ///
    /// # Errors
    ///
    /// `NotDeleted`, `NotFound`.
    pub async fn restore(&self, id: Uuid) -> Result<suppliers::Model, StockError> {
        soft_delete::restore::<suppliers::Entity>(&self.db, id).await
    }
}
