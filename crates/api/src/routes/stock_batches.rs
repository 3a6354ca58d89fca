//! Stock batch routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use stockwise_core::auth::Capability;
use stockwise_core::ledger::NewStockBatch;
use stockwise_db::entities::stock_batches;
use stockwise_db::repositories::{StockBatchFilter, StockBatchRepository};
use stockwise_shared::types::{
    ListQuery, PageResponse, ProductVariantId, StockBatchId, SupplierId,
};
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the stock batch routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock-batches", get(list_batches).post(create_batch))
        .route("/stock-batches/{batch_id}", get(get_batch).delete(delete_batch))
        .route("/stock-batches/{batch_id}/restore", post(restore_batch))
}

/// Request body for receiving a stock batch.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStockBatchRequest {
    /// Variant the stock belongs to.
    pub product_variant_id: ProductVariantId,
    /// Supplier, if known.
    pub supplier_id: Option<SupplierId>,
    /// Units received.
    #[validate(range(min = 1))]
    pub quantity_received: i32,
    /// Cost per unit.
    pub buy_price_per_unit: Decimal,
    /// Listed selling price per unit.
    pub sell_price_per_unit: Decimal,
    /// Price floor per unit.
    pub min_sale_price_per_unit: Decimal,
    /// Receipt time. Defaults to now.
    pub received_at: Option<DateTime<FixedOffset>>,
}

/// Filters for listing batches.
#[derive(Debug, Default, Deserialize)]
pub struct BatchFilterQuery {
    /// Only batches of this variant.
    pub product_variant_id: Option<ProductVariantId>,
    /// Only batches from this supplier.
    pub supplier_id: Option<SupplierId>,
}

fn repo(state: &AppState) -> StockBatchRepository {
    StockBatchRepository::new((*state.db).clone())
}

/// POST `/stock-batches` - Receive stock.
async fn create_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateStockBatchRequest>,
) -> ApiResult<(StatusCode, Json<stock_batches::Model>)> {
    auth.require(Capability::ManageStock)?;
    payload.validate()?;

    let batch = repo(&state)
        .create(NewStockBatch {
            product_variant_id: payload.product_variant_id.into_inner(),
            supplier_id: payload.supplier_id.map(SupplierId::into_inner),
            quantity_received: payload.quantity_received,
            buy_price_per_unit: payload.buy_price_per_unit,
            sell_price_per_unit: payload.sell_price_per_unit,
            min_sale_price_per_unit: payload.min_sale_price_per_unit,
            received_at: payload.received_at.unwrap_or_else(|| Utc::now().fixed_offset()),
        })
        .await?;

    info!(
        batch_id = %batch.id,
        product_variant_id = %batch.product_variant_id,
        quantity = batch.quantity_received,
        user_id = %auth.user_id(),
        "Stock batch received"
    );

    Ok((StatusCode::CREATED, Json(batch)))
}

/// GET `/stock-batches` - List batches.
async fn list_batches(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filter): Query<BatchFilterQuery>,
) -> ApiResult<Json<PageResponse<stock_batches::Model>>> {
    auth.require(Capability::Read)?;

    let filter = StockBatchFilter {
        product_variant_id: filter.product_variant_id.map(ProductVariantId::into_inner),
        supplier_id: filter.supplier_id.map(SupplierId::into_inner),
    };
    Ok(Json(repo(&state).list(&filter, &query).await?))
}

/// GET `/stock-batches/{batch_id}` - Get a batch, deleted or not.
async fn get_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(batch_id): Path<StockBatchId>,
) -> ApiResult<Json<stock_batches::Model>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).find_by_id(batch_id.into_inner()).await?))
}

/// DELETE `/stock-batches/{batch_id}` - Soft-delete a batch.
async fn delete_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(batch_id): Path<StockBatchId>,
) -> ApiResult<Json<stock_batches::Model>> {
    auth.require(Capability::ManageStock)?;
    Ok(Json(repo(&state).delete(batch_id.into_inner()).await?))
}

/// POST `/stock-batches/{batch_id}/restore` - Restore a deleted batch.
async fn restore_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(batch_id): Path<StockBatchId>,
) -> ApiResult<Json<stock_batches::Model>> {
    auth.require(Capability::ManageStock)?;
    Ok(Json(repo(&state).restore(batch_id.into_inner()).await?))
}
