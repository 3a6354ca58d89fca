//! Core business logic for Stockwise.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Stock batches and their quantity invariants
//! - `allocation` - FIFO split of sale quantities across batches
//! - `reversal` - Restoring batches and sale totals for deleted sale items
//! - `sku` - SKU normalization and collision probing
//! - `sale` - Sale total arithmetic
//! - `lifecycle` - Soft-delete transitions and dependency rules
//! - `auth` - Roles and capabilities

pub mod allocation;
pub mod auth;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod reversal;
pub mod sale;
pub mod sku;

pub use error::{StockError, StockResult};
