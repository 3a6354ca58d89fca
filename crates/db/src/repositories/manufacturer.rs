//! Manufacturer repository.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use stockwise_core::StockError;
use stockwise_shared::types::{ListQuery, PageResponse};
use uuid::Uuid;

use crate::entities::manufacturers;
use crate::error::db_err;
use crate::listing::fetch_page;
use crate::soft_delete;

/// Input for creating a manufacturer.
#[derive(Debug, Clone)]
pub struct CreateManufacturerInput {
    /// Manufacturer name.
    pub name: String,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Contact phone.
    pub contact_phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// Manufacturer repository.
#[derive(Debug, Clone)]
pub struct ManufacturerRepository {
    db: DatabaseConnection,
}

impl ManufacturerRepository {
    /// Creates a new manufacturer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a manufacturer.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty name.
    pub async fn create(
        &self,
        input: CreateManufacturerInput,
    ) -> Result<manufacturers::Model, StockError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StockError::Validation(
                "manufacturer name is required".to_string(),
            ));
        }

        let now = Utc::now().into();
        manufacturers::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
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

    /// Finds a manufacturer by ID, deleted or not.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row exists.
    pub async fn find_by_id(&self, id: Uuid) -> Result<manufacturers::Model, StockError> {
        manufacturers::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("manufacturer", id))
    }

    /// Lists manufacturers.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sort column is unknown.
    pub async fn list(
        &self,
        query: &ListQuery,
    ) -> Result<PageResponse<manufacturers::Model>, StockError> {
        fetch_page(&self.db, manufacturers::Entity::find(), query).await
    }

    /// Soft-deletes a manufacturer with no active products.
    ///
    /// # Errors
    ///
    /// `HasActiveDependents`, `AlreadyDeleted`, `NotFound`.
    pub async fn delete(&self, id: Uuid) -> Result<manufacturers::Model, StockError> {
        soft_delete::soft_delete::<manufacturers::Entity>(&self.db, id).await
    }

    /// Restores a soft-deleted manufacturer.
    ///
    /// # Errors
    ///
    /// `NotDeleted`, `NotFound`.
    pub async fn restore(&self, id: Uuid) -> Result<manufacturers::Model, StockError> {
        soft_delete::restore::<manufacturers::Entity>(&self.db, id).await
    }
}
