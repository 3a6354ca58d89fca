//! Sale item routes. Deleting an item reverses its stock allocations.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockwise_core::auth::Capability;
use stockwise_db::entities::{sale_item_batch_allocations, sale_items};
use stockwise_db::repositories::{ReversalRepository, SaleItemFilter, SaleItemRepository};
use stockwise_shared::types::{ListQuery, PageResponse, ProductVariantId, SaleId, SaleItemId};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the sale item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sale-items", get(list_items))
        .route("/sale-items/{item_id}", get(get_item).delete(reverse_item))
}

/// Filters for listing sale items.
#[derive(Debug, Default, Deserialize)]
pub struct SaleItemFilterQuery {
    /// Only items of this sale.
    pub sale_id: Option<SaleId>,
    /// Only items of this variant.
    pub product_variant_id: Option<ProductVariantId>,
}

/// A sale item with its batch allocations.
#[derive(Debug, Serialize)]
pub struct SaleItemDetail {
    /// The sale item.
    pub sale_item: sale_items::Model,
    /// Units taken per batch.
    pub allocations: Vec<sale_item_batch_allocations::Model>,
}

/// Units returned to one batch.
#[derive(Debug, Serialize)]
pub struct RestorationResponse {
    /// The batch.
    pub batch_id: Uuid,
    /// Units put back.
    pub quantity: i32,
}

/// Result of reversing a sale item.
#[derive(Debug, Serialize)]
pub struct ReversalResponse {
    /// The now-deleted sale item.
    pub sale_item: sale_items::Model,
    /// Units returned per batch.
    pub restorations: Vec<RestorationResponse>,
    /// Sale total after the reversal.
    pub sale_total: Decimal,
}

/// GET `/sale-items` - List sale items.
async fn list_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
    Query(filter): Query<SaleItemFilterQuery>,
) -> ApiResult<Json<PageResponse<sale_items::Model>>> {
    auth.require(Capability::Read)?;

    let filter = SaleItemFilter {
        sale_id: filter.sale_id.map(SaleId::into_inner),
        product_variant_id: filter.product_variant_id.map(ProductVariantId::into_inner),
    };
    Ok(Json(
        SaleItemRepository::new((*state.db).clone())
            .list(&filter, &query)
            .await?,
    ))
}

/// GET `/sale-items/{item_id}` - Get a sale item with its allocations.
async fn get_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<SaleItemId>,
) -> ApiResult<Json<SaleItemDetail>> {
    auth.require(Capability::Read)?;

    let found = SaleItemRepository::new((*state.db).clone())
        .find_by_id(item_id.into_inner())
        .await?;
    Ok(Json(SaleItemDetail {
        sale_item: found.sale_item,
        allocations: found.allocations,
    }))
}

/// DELETE `/sale-items/{item_id}` - Reverse a sale item.
///
/// Stock goes back to the batches it came from and the sale total drops by
/// the line total. A second call fails with `ALREADY_REVERSED`.
async fn reverse_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<SaleItemId>,
) -> ApiResult<Json<ReversalResponse>> {
    auth.require(Capability::ReverseSales)?;

    let outcome = ReversalRepository::new((*state.db).clone(), state.allocation_max_retries)
        .reverse(item_id.into_inner())
        .await?;

    info!(
        sale_item_id = %outcome.sale_item.id,
        user_id = %auth.user_id(),
        "Sale item reversed via API"
    );

    Ok(Json(ReversalResponse {
        sale_item: outcome.sale_item,
        restorations: outcome
            .restorations
            .into_iter()
            .map(|r| RestorationResponse {
                batch_id: r.batch_id,
                quantity: r.quantity,
            })
            .collect(),
        sale_total: outcome.sale_total,
    }))
}
