//! Product and product variant repository, including SKU generation.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use stockwise_core::StockError;
use stockwise_core::sku::SkuGenerator;
use stockwise_shared::types::{ListQuery, PageResponse};
use uuid::Uuid;

use crate::entities::{categories, manufacturers, product_variants, products};
use crate::error::{db_err, is_unique_violation};
use crate::listing::fetch_page;
use crate::soft_delete::{self, lock_active_shared};

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Product name.
    pub name: String,
    /// Brand, used as the SKU prefix.
    pub brand: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Manufacturer, must be active.
    pub manufacturer_id: Option<Uuid>,
    /// Category, must be active.
    pub category_id: Option<Uuid>,
}

/// Outcome of one attempt at committing a variant.
enum VariantAttempt {
    Created(product_variants::Model),
    Taken(String),
}

/// Product repository.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
    sku_max_attempts: u32,
}

impl ProductRepository {
    /// Creates a new product repository.
    ///
    /// `sku_max_attempts` bounds how many SKU commits are tried before giving
    /// up with `Conflict`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, sku_max_attempts: u32) -> Self {
        Self {
            db,
            sku_max_attempts,
        }
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty name, `NotFound` for a missing manufacturer
    /// or category.
    pub async fn create(&self, input: CreateProductInput) -> Result<products::Model, StockError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StockError::Validation("product name is required".to_string()));
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(manufacturer_id) = input.manufacturer_id {
            lock_active_shared::<manufacturers::Entity, _>(&txn, manufacturer_id).await?;
        }
        if let Some(category_id) = input.category_id {
            lock_active_shared::<categories::Entity, _>(&txn, category_id).await?;
        }

        let now = Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            brand: Set(input.brand),
            description: Set(input.description),
            manufacturer_id: Set(input.manufacturer_id),
            category_id: Set(input.category_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(product)
    }

    /// Finds a product by ID, deleted or not.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row exists.
    pub async fn find_by_id(&self, id: Uuid) -> Result<products::Model, StockError> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("product", id))
    }

    /// Lists products.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sort column is unknown.
    pub async fn list(&self, query: &ListQuery) -> Result<PageResponse<products::Model>, StockError> {
        fetch_page(&self.db, products::Entity::find(), query).await
    }

    /// Soft-deletes a product with no active variants.
    ///
    /// # Errors
    ///
    /// `HasActiveDependents`, `AlreadyDeleted`, `NotFound`.
    pub async fn delete(&self, id: Uuid) -> Result<products::Model, StockError> {
        soft_delete::soft_delete::<products::Entity>(&self.db, id).await
    }

    /// Restores a soft-deleted product.
    ///
    /// # Errors
    ///
    /// `NotDeleted`, `NotFound`.
    pub async fn restore(&self, id: Uuid) -> Result<products::Model, StockError> {
        soft_delete::restore::<products::Entity>(&self.db, id).await
    }

    /// Creates a variant with a generated, unique SKU.
    ///
    /// The SKU is `[BRAND-]PRODUCT-VARIANT`, suffixed `-1`, `-2`, ... when
    /// taken. A commit that loses a race on the UNIQUE constraint re-probes
    /// and tries the next free suffix.
    ///
    /// # Errors
    ///
    /// `NotFound` if the product is missing or deleted, `Validation` if the
    /// base code normalizes to empty, `Conflict` once attempts run out.
    pub async fn create_variant(
        &self,
        product_id: Uuid,
        variant_name: &str,
    ) -> Result<product_variants::Model, StockError> {
        let max_attempts = self.sku_max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.try_create_variant(product_id, variant_name).await? {
                VariantAttempt::Created(variant) => {
                    tracing::info!(
                        product_id = %product_id,
                        variant_id = %variant.id,
                        sku = %variant.sku,
                        "product variant created"
                    );
                    return Ok(variant);
                }
                VariantAttempt::Taken(sku) => {
                    tracing::warn!(attempt, %sku, "SKU claimed concurrently, re-probing");
                }
            }
        }

        Err(StockError::Conflict(format!(
            "no free SKU for product {product_id} after {max_attempts} attempts"
        )))
    }

    async fn try_create_variant(
        &self,
        product_id: Uuid,
        variant_name: &str,
    ) -> Result<VariantAttempt, StockError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let product = lock_active_shared::<products::Entity, _>(&txn, product_id).await?;
        let base = SkuGenerator::base_code(product.brand.as_deref(), &product.name, variant_name)?;

        // Deleted variants keep their SKU
        let taken: HashSet<String> = product_variants::Entity::find()
            .select_only()
            .column(product_variants::Column::Sku)
            .filter(
                Condition::any()
                    .add(product_variants::Column::Sku.eq(base.as_str()))
                    .add(product_variants::Column::Sku.like(SkuGenerator::suffix_pattern(&base))),
            )
            .into_tuple::<String>()
            .all(&txn)
            .await
            .map_err(db_err)?
            .into_iter()
            .collect();

        let sku = SkuGenerator::first_free(&base, &taken);

        let now = Utc::now().into();
        let inserted = product_variants::ActiveModel {
            id: Set(Uuid::now_v7()),
            product_id: Set(product.id),
            name: Set(variant_name.trim().to_string()),
            sku: Set(sku.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await;

        match inserted {
            Ok(variant) => {
                txn.commit().await.map_err(db_err)?;
                Ok(VariantAttempt::Created(variant))
            }
            Err(err) if is_unique_violation(&err) => Ok(VariantAttempt::Taken(sku)),
            Err(err) => Err(db_err(err)),
        }
    }

    /// Finds a variant by ID, deleted or not.
    ///
    /// # Errors
    ///
    /// `NotFound` when no row exists.
    pub async fn find_variant(&self, id: Uuid) -> Result<product_variants::Model, StockError> {
        product_variants::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StockError::not_found("product variant", id))
    }

    /// Lists variants of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sort column is unknown.
    pub async fn list_variants(
        &self,
        product_id: Uuid,
        query: &ListQuery,
    ) -> Result<PageResponse<product_variants::Model>, StockError> {
        let select = product_variants::Entity::find()
            .filter(product_variants::Column::ProductId.eq(product_id));
        fetch_page(&self.db, select, query).await
    }

    /// Soft-deletes a variant with no active stock batches.
    ///
    /// # Errors
    ///
    /// `HasActiveDependents`, `AlreadyDeleted`, `NotFound`.
    pub async fn delete_variant(&self, id: Uuid) -> Result<product_variants::Model, StockError> {
        soft_delete::soft_delete::<product_variants::Entity>(&self.db, id).await
    }

    /// Restores a soft-deleted variant.
    ///
    /// # Errors
    ///
    /// `NotDeleted`, `NotFound`.
    pub async fn restore_variant(&self, id: Uuid) -> Result<product_variants::Model, StockError> {
        soft_delete::restore::<product_variants::Entity>(&self.db, id).await
    }
}
