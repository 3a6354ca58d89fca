//! Stock-batch ledger.
//!
//! This module implements the ledger rules:
//! - Domain types for received batches and their remaining levels
//! - Validation of new batches
//! - Quantity invariants for decrements and increments

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::LedgerService;
pub use types::{BatchLevel, NewStockBatch};
