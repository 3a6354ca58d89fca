//! Supplier routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use stockwise_core::auth::Capability;
use stockwise_db::entities::suppliers;
use stockwise_db::repositories::{CreateSupplierInput, SupplierRepository};
use stockwise_shared::types::{ListQuery, PageResponse, SupplierId};
use validator::Validate;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the supplier routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/{supplier_id}",
            get(get_supplier).delete(delete_supplier),
        )
        .route("/suppliers/{supplier_id}/restore", post(restore_supplier))
}

/// Request body for creating a supplier.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    /// Supplier name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Contact person.
    pub contact_name: Option<String>,
    /// Contact email.
    #[validate(email)]
    pub contact_email: Option<String>,
    /// Contact phone.
    #[validate(length(max = 50))]
    pub contact_phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

fn repo(state: &AppState) -> SupplierRepository {
    SupplierRepository::new((*state.db).clone())
}

async fn create_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateSupplierRequest>,
) -> ApiResult<(StatusCode, Json<suppliers::Model>)> {
    auth.require(Capability::ManageCatalog)?;
    payload.validate()?;

    let supplier = repo(&state)
        .create(CreateSupplierInput {
            name: payload.name,
            contact_name: payload.contact_name,
            contact_email: payload.contact_email,
            contact_phone: payload.contact_phone,
            address: payload.address,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn list_suppliers(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<suppliers::Model>>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).list(&query).await?))
}

async fn get_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(supplier_id): Path<SupplierId>,
) -> ApiResult<Json<suppliers::Model>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).find_by_id(supplier_id.into_inner()).await?))
}

async fn delete_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(supplier_id): Path<SupplierId>,
) -> ApiResult<Json<suppliers::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).delete(supplier_id.into_inner()).await?))
}

async fn restore_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(supplier_id): Path<SupplierId>,
) -> ApiResult<Json<suppliers::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).restore(supplier_id.into_inner()).await?))
}
