//! Category routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use stockwise_core::auth::Capability;
use stockwise_db::CategoryRepository;
use stockwise_db::entities::categories;
use stockwise_shared::types::{CategoryId, ListQuery, PageResponse};
use validator::Validate;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{category_id}",
            get(get_category).delete(delete_category),
        )
        .route("/categories/{category_id}/restore", post(restore_category))
}

/// Request body for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Category name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Description.
    pub description: Option<String>,
}

fn repo(state: &AppState) -> CategoryRepository {
    CategoryRepository::new((*state.db).clone())
}

async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<categories::Model>)> {
    auth.require(Capability::ManageCatalog)?;
    payload.validate()?;

    let category = repo(&state)
        .create(&payload.name, payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<categories::Model>>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).list(&query).await?))
}

async fn get_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<CategoryId>,
) -> ApiResult<Json<categories::Model>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).find_by_id(category_id.into_inner()).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<CategoryId>,
) -> ApiResult<Json<categories::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).delete(category_id.into_inner()).await?))
}

async fn restore_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<CategoryId>,
) -> ApiResult<Json<categories::Model>> {
    auth.require(Capability::ManageCatalog)?;
    Ok(Json(repo(&state).restore(category_id.into_inner()).await?))
}
