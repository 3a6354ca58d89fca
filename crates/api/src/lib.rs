//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Authentication middleware and the role guard
//! - Rate limiting for mutating routes
//! - Error to HTTP response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use stockwise_shared::JwtService;

pub use middleware::rate_limit::{InMemoryRateLimitStore, RateLimitStore, run_janitor};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token verification.
    pub jwt_service: Arc<JwtService>,
    /// Request windows for the rate limiter.
    pub rate_limiter: Arc<dyn RateLimitStore>,
    /// Attempts per allocation or reversal before giving up on contention.
    pub allocation_max_retries: u32,
    /// Attempts per variant before giving up on SKU collisions.
    pub sku_max_attempts: u32,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
