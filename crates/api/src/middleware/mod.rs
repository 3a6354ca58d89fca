//! Request middleware.

pub mod auth;
pub mod rate_limit;

pub use auth::{AuthUser, auth_middleware};
pub use rate_limit::rate_limit_middleware;
