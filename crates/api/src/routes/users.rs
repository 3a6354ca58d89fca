//! User routes. Credentials are managed by the external auth service.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use stockwise_core::auth::{Capability, Role};
use stockwise_db::UserRepository;
use stockwise_db::entities::users;
use stockwise_shared::types::{ListQuery, PageResponse, UserId};
use tracing::info;
use validator::Validate;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", get(get_user).delete(delete_user))
        .route("/users/{user_id}/restore", post(restore_user))
}

/// Request body for registering a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Login email, unique.
    #[validate(email)]
    pub email: String,
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    /// Role granted.
    pub role: Role,
}

fn repo(state: &AppState) -> UserRepository {
    UserRepository::new((*state.db).clone())
}

async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<users::Model>)> {
    auth.require(Capability::ManageUsers)?;
    payload.validate()?;

    let user = repo(&state)
        .create(&payload.email, &payload.full_name, payload.role)
        .await?;

    info!(user_id = %user.id, role = %payload.role, created_by = %auth.user_id(), "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PageResponse<users::Model>>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).list(&query).await?))
}

async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<users::Model>> {
    auth.require(Capability::Read)?;
    Ok(Json(repo(&state).find_by_id(user_id.into_inner()).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<users::Model>> {
    auth.require(Capability::ManageUsers)?;
    Ok(Json(repo(&state).delete(user_id.into_inner()).await?))
}

async fn restore_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<users::Model>> {
    auth.require(Capability::ManageUsers)?;
    Ok(Json(repo(&state).restore(user_id.into_inner()).await?))
}
