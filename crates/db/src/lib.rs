//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Soft-delete and listing helpers shared by every repository
//! - Database migrations

pub mod entities;
mod error;
pub mod listing;
pub mod migration;
pub mod repositories;
pub mod soft_delete;

pub use repositories::{
    AllocationRepository, CategoryRepository, ManufacturerRepository, ProductRepository,
    ReversalRepository, SaleItemRepository, SaleRepository, StockBatchRepository,
    SupplierRepository, UserRepository,
};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection with explicit pool bounds.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with_pool(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
    acquire_timeout: Duration,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(acquire_timeout)
        .sqlx_logging(false);
    Database::connect(options).await
}
