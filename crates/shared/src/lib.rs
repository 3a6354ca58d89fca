//! Shared types, errors, and configuration for Stockwise.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination and list query types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - Verification of bearer tokens issued by the external auth service

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
