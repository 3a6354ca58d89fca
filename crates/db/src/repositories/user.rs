//! User repository for database operations.
//!
//! Credentials live with the external auth service; this table only carries
//! identity and role.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use stockwise_core::StockError;
use stockwise_core::auth::Role;
use stockwise_shared::types::{ListQuery, PageResponse};
use uuid::Uuid;

use crate::entities::users;
use crate::error::{conflict_or_db, db_err};
use crate::listing::fetch_page;
use crate::soft_delete;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, StockError> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Finds a user by ID, deleted or not.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row exists.
    pub async fn find_by_id(&self, id: Uuid) -> Result<users::Model, StockError> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("user", id))
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// `Conflict` when the email is taken.
    pub async fn create(
        &self,
        email: &str,
        full_name: &str,
        role: Role,
    ) -> Result<users::Model, StockError> {
        let now = Utc::now().into();
        users::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(email.trim().to_lowercase()),
            full_name: Set(full_name.trim().to_string()),
            role: Set(role.into()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| conflict_or_db(e, "user with this email"))
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, StockError> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(count > 0)
    }

    /// Lists users.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sort column is unknown.
    pub async fn list(&self, query: &ListQuery) -> Result<PageResponse<users::Model>, StockError> {
        fetch_page(&self.db, users::Entity::find(), query).await
    }

    /// Soft-deletes a user.
    ///
    /// # Errors
    ///
    /// `AlreadyDeleted`, `NotFound`.
    pub async fn delete(&self, id: Uuid) -> Result<users::Model, StockError> {
        soft_delete::soft_delete::<users::Entity>(&self.db, id).await
    }

    /// Restores a soft-deleted user.
    ///
    /// # Errors
    ///
    /// `NotDeleted`, `NotFound`.
    pub async fn restore(&self, id: Uuid) -> Result<users::Model, StockError> {
        soft_delete::restore::<users::Entity>(&self.db, id).await
    }
}
