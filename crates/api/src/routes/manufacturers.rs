//! Manufacturer routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use stockwise_core::auth::Capability;
use stockwise_db::entities::manufacturers;
use stockwise_db::repositories::{CreateManufacturerInput, ManufacturerRepository};
use stockwise_shared::types::{ListQuery, ManufacturerId, PageResponse};
use validator::Validate;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the manufacturer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/manufacturers",
            get(list_manufacturers).post(create_manufacturer),
        )
        .route(
            "/manufacturers/{manufacturer_id}",
            get(get_manufacturer).delete(delete_manufacturer),
        )
        .route(
            "/manufacturers/{manufacturer_id}/restore",
            post(restore_manufacturer),
        )
}

/// Request body for creating a manufacturer.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateManufacturerRequest {
    /// Manufacturer name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Contact email.
    #[validate(email)]
    pub contact_email: Option<String>,
    /// Contact phone.
    #[validate(length(max = 50))]
    pub contact_phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

fn repo(state: &AppState) -> ManufacturerRepository {
    ManufacturerRepository::new((*state.db).clone())
}

async fn create_manufacturer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateManufacturerRequest>,
) -> ApiResult<(StatusCode, Json<manufacturers::Model>)> {
    auth.require(Capability::ManageCatalog)?;
    payload.validate()?;

    let manufacturer = repo(&state)
        .create(CreateManufacturerInput {
            name: payload.name,
            contact_email: payload.contact_email,
            contact_phone: payload.contact_phone,
            address: payload.address,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(manufacturer)))
}

async fn list_manufacturers(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<manufacturers::Model>>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).list(&query).await?))
}

async fn get_manufacturer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(manufacturer_id): Path<ManufacturerId>,
) -> ApiResult<Json<manufacturers::Model>> {
    auth.require(Capability::Read)?;
    Ok(Json(
        repo(&state)
            .find_by_id(manufacturer_id.into_inner())
            .await?,
    ))
}

async fn delete_manufacturer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(manufacturer_id): Path<ManufacturerId>,
) -> ApiResult<Json<manufacturers::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).delete(manufacturer_id.into_inner()).await?))
}

async fn restore_manufacturer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(manufacturer_id): Path<ManufacturerId>,
) -> ApiResult<Json<manufacturers::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).restore(manufacturer_id.into_inner()).await?))
}
