//! API route definitions.

use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::{auth_middleware, rate_limit_middleware};

pub mod categories;
pub mod health;
pub mod manufacturers;
pub mod products;
pub mod sale_items;
pub mod sales;
pub mod stock_batches;
pub mod suppliers;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
///
/// Protected routes run auth first, then the rate limiter, so callers are
/// keyed by user id.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(stock_batches::routes())
        .merge(sales::routes())
        .merge(sale_items::routes())
        .merge(products::routes())
        .merge(suppliers::routes())
        .merge(manufacturers::routes())
        .merge(categories::routes())
        .merge(users::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
