//! Sale routes, including ringing up items against stock.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockwise_core::auth::Capability;
use stockwise_db::entities::{sale_item_batch_allocations, sale_items, sales};
use stockwise_db::repositories::{
    AllocateInput, AllocationRepository, CreateSaleInput, SaleItemFilter, SaleItemRepository,
    SaleRepository, UpdateSaleInput,
};
use stockwise_shared::types::{ListQuery, PageResponse, ProductVariantId, SaleId};
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the sale routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route(
            "/sales/{sale_id}",
            get(get_sale).patch(update_sale).delete(delete_sale),
        )
        .route("/sales/{sale_id}/restore", post(restore_sale))
        .route(
            "/sales/{sale_id}/items",
            get(list_sale_items).post(create_sale_item),
        )
}

/// Request body for opening a sale.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateSaleRequest {
    /// Customer name.
    #[validate(length(max = 255))]
    pub customer_name: Option<String>,
    /// Customer phone.
    #[validate(length(max = 50))]
    pub customer_phone: Option<String>,
    /// Customer email.
    #[validate(email)]
    pub customer_email: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for editing sale metadata. Totals are not editable.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSaleRequest {
    /// Customer name.
    #[validate(length(max = 255))]
    pub customer_name: Option<String>,
    /// Customer phone.
    #[validate(length(max = 50))]
    pub customer_phone: Option<String>,
    /// Customer email.
    #[validate(email)]
    pub customer_email: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for ringing up a sale item.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleItemRequest {
    /// Variant being sold.
    pub product_variant_id: ProductVariantId,
    /// Units sold.
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Price charged per unit.
    pub unit_price: Decimal,
}

/// A recorded sale item with the batches it drew from.
#[derive(Debug, Serialize)]
pub struct SaleItemResponse {
    /// The sale item.
    pub sale_item: sale_items::Model,
    /// Units taken per batch.
    pub allocations: Vec<sale_item_batch_allocations::Model>,
    /// Sale total after the item was added.
    pub sale_total: Decimal,
}

/// POST `/sales` - Open an empty sale.
async fn create_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<sales::Model>)> {
    auth.require(Capability::RecordSales)?;
    payload.validate()?;

    let sale = SaleRepository::new((*state.db).clone())
        .create(CreateSaleInput {
            customer_name: payload.customer_name,
            customer_phone: payload.customer_phone,
            customer_email: payload.customer_email,
            notes: payload.notes,
            created_by: Some(auth.user_id()),
        })
        .await?;

    info!(sale_id = %sale.id, user_id = %auth.user_id(), "Sale opened");
    Ok((StatusCode::CREATED, Json(sale)))
}

/// GET `/sales` - List sales.
async fn list_sales(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<sales::Model>>> {
    auth.require(Capability::Read)?;
    Ok(Json(SaleRepository::new((*state.db).clone()).list(&query).await?))
}

/// GET `/sales/{sale_id}` - Get a sale, deleted or not.
async fn get_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(sale_id): Path<SaleId>,
) -> ApiResult<Json<sales::Model>> {
    auth.require(Capability::Read)?;
    Ok(Json(
        SaleRepository::new((*state.db).clone())
            .find_by_id(sale_id.into_inner())
            .await?,
    ))
}

/// PATCH `/sales/{sale_id}` - Edit customer details and notes.
async fn update_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(sale_id): Path<SaleId>,
    Json(payload): Json<UpdateSaleRequest>,
) -> ApiResult<Json<sales::Model>> {
    auth.require(Capability::RecordSales)?;
    payload.validate()?;

    let sale = SaleRepository::new((*state.db).clone())
        .update(
            sale_id.into_inner(),
            UpdateSaleInput {
                customer_name: payload.customer_name,
                customer_phone: payload.customer_phone,
                customer_email: payload.customer_email,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(sale))
}

/// DELETE `/sales/{sale_id}` - Soft-delete a sale with no active items.
async fn delete_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(sale_id): Path<SaleId>,
) -> ApiResult<Json<sales::Model>> {
    auth.require(Capability::ReverseSales)?;
    let sale = SaleRepository::new((*state.db).clone())
        .delete(sale_id.into_inner())
        .await?;
    Ok(Json(sale))
}

/// POST `/sales/{sale_id}/restore` - Restore a deleted sale.
async fn restore_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(sale_id): Path<SaleId>,
) -> ApiResult<Json<sales::Model>> {
    auth.require(Capability::ReverseSales)?;
    let sale = SaleRepository::new((*state.db).clone())
        .restore(sale_id.into_inner())
        .await?;
    Ok(Json(sale))
}

/// POST `/sales/{sale_id}/items` - Ring up an item, drawing stock FIFO.
async fn create_sale_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(sale_id): Path<SaleId>,
    Json(payload): Json<CreateSaleItemRequest>,
) -> ApiResult<(StatusCode, Json<SaleItemResponse>)> {
    auth.require(Capability::RecordSales)?;
    payload.validate()?;

    let outcome = AllocationRepository::new((*state.db).clone(), state.allocation_max_retries)
        .allocate(&AllocateInput {
            sale_id: sale_id.into_inner(),
            product_variant_id: payload.product_variant_id.into_inner(),
            quantity: payload.quantity,
            unit_price: payload.unit_price,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SaleItemResponse {
            sale_item: outcome.sale_item,
            allocations: outcome.allocations,
            sale_total: outcome.sale_total,
        }),
    ))
}

/// GET `/sales/{sale_id}/items` - List a sale's items.
async fn list_sale_items(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(sale_id): Path<SaleId>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<sale_items::Model>>> {
    auth.require(Capability::Read)?;

    let filter = SaleItemFilter {
        sale_id: Some(sale_id.into_inner()),
        product_variant_id: None,
    };
    Ok(Json(
        SaleItemRepository::new((*state.db).clone())
            .list(&filter, &query)
            .await?,
    ))
}
