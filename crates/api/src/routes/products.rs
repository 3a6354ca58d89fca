//! Product and variant routes. Creating a variant generates its SKU.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use stockwise_core::auth::Capability;
use stockwise_db::entities::{product_variants, products};
use stockwise_db::repositories::{CreateProductInput, ProductRepository};
use stockwise_shared::types::{
    CategoryId, ListQuery, ManufacturerId, PageResponse, ProductId, ProductVariantId,
};
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the product and variant routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{product_id}",
            get(get_product).delete(delete_product),
        )
        .route("/products/{product_id}/restore", post(restore_product))
        .route(
            "/products/{product_id}/variants",
            get(list_variants).post(create_variant),
        )
        .route(
            "/product-variants/{variant_id}",
            get(get_variant).delete(delete_variant),
        )
        .route("/product-variants/{variant_id}/restore", post(restore_variant))
}

/// Request body for creating a product.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    /// Product name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Brand, used as the SKU prefix.
    #[validate(length(max = 100))]
    pub brand: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Manufacturer.
    pub manufacturer_id: Option<ManufacturerId>,
    /// Category.
    pub category_id: Option<CategoryId>,
}

/// Request body for creating a variant.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVariantRequest {
    /// Variant name, e.g. `"100ml"`. May be empty.
    #[validate(length(max = 255))]
    #[serde(default)]
    pub name: String,
}

fn repo(state: &AppState) -> ProductRepository {
    ProductRepository::new((*state.db).clone(), state.sku_max_attempts)
}

/// POST `/products` - Create a product.
async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<products::Model>)> {
    auth.require(Capability::ManageCatalog)?;
    payload.validate()?;

    let product = repo(&state)
        .create(CreateProductInput {
            name: payload.name,
            brand: payload.brand,
            description: payload.description,
            manufacturer_id: payload.manufacturer_id.map(ManufacturerId::into_inner),
            category_id: payload.category_id.map(CategoryId::into_inner),
        })
        .await?;

    info!(product_id = %product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET `/products` - List products.
async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<products::Model>>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).list(&query).await?))
}

/// GET `/products/{product_id}` - Get a product.
async fn get_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<ProductId>,
) -> ApiResult<Json<products::Model>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).find_by_id(product_id.into_inner()).await?))
}

/// DELETE `/products/{product_id}` - Soft-delete a product with no active variants.
async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<ProductId>,
) -> ApiResult<Json<products::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).delete(product_id.into_inner()).await?))
}

/// POST `/products/{product_id}/restore` - Restore a deleted product.
async fn restore_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<ProductId>,
) -> ApiResult<Json<products::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).restore(product_id.into_inner()).await?))
}

/// POST `/products/{product_id}/variants` - Create a variant with a generated SKU.
async fn create_variant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<ProductId>,
    Json(payload): Json<CreateVariantRequest>,
) -> ApiResult<(StatusCode, Json<product_variants::Model>)> {
    auth.require(Capability::ManageCatalog)?;
    payload.validate()?;

    let variant = repo(&state)
        .create_variant(product_id.into_inner(), &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

/// GET `/products/{product_id}/variants` - List a product's variants.
async fn list_variants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<ProductId>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<product_variants::Model>>> {
    auth.require(Capability::Read)?;
    Ok(Json(
        repo(&state)
            .list_variants(product_id.into_inner(), &query)
            .await?,
    ))
}

/// GET `/product-variants/{variant_id}` - Get a variant.
async fn get_variant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(variant_id): Path<ProductVariantId>,
) -> ApiResult<Json<product_variants::Model>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).find_variant(variant_id.into_inner()).await?))
}

/// DELETE `/product-variants/{variant_id}` - Soft-delete a variant with no active batches.
async fn delete_variant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(variant_id): Path<ProductVariantId>,
) -> ApiResult<Json<product_variants::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).delete_variant(variant_id.into_inner()).await?))
}

/// POST `/product-variants/{variant_id}/restore` - Restore a deleted variant.
async fn restore_variant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(variant_id): Path<ProductVariantId>,
) -> ApiResult<Json<product_variants::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).restore_variant(variant_id.into_inner()).await?))
}
