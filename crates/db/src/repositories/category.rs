//! Category repository.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use stockwise_core::StockError;
use stockwise_shared::types::{ListQuery, PageResponse};
use uuid::Uuid;

use crate::entities::categories;
use crate::error::db_err;
use crate::listing::fetch_page;
use crate::soft_delete;

/// Category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty name.
    pub async fn create(
        &self,
        name: &str,
        description: Option<String>,
    ) -> Result<categories::Model, StockError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StockError::Validation("category name is required".to_string()));
        }

        let now = Utc::now().into();
        categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)
    }

    /// Finds a category by ID, deleted or not.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row exists.
    pub async fn find_by_id(&self, id: Uuid) -> Result<categories::Model, StockError> {
        categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("category", id))
    }

    /// Lists categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sort column is unknown.
    pub async fn list(
        &self,
        query: &ListQuery,
    ) -> Result<PageResponse<categories::Model>, StockError> {
        fetch_page(&self.db, categories::Entity::find(), query).await
    }

    /// Soft-deletes a category.
    ///
    /// # Errors
    ///
    /// `AlreadyDeleted`, `NotFound`.
    pub async fn delete(&self, id: Uuid) -> Result<categories::Model, StockError> {
        soft_delete::soft_delete::<categories::Entity>(&self.db, id).await
    }

    /// Restores a soft-deleted category.
    ///
    /// # Errors
    ///
    /// `NotDeleted`, `NotFound`.
    pub async fn restore(&self, id: Uuid) -> Result<categories::Model, StockError> {
        soft_delete::restore::<categories::Entity>(&self.db, id).await
    }
}
