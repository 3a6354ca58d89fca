//! Mapping of `SeaORM` errors into `StockError`.

use sea_orm::{DbErr, SqlErr};
use stockwise_core::StockError;

/// Wraps any database failure as `StockError::Database`.
pub(crate) fn db_err(err: DbErr) -> StockError {
    StockError::Database(err.to_string())
}

/// Whether `err` is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Maps unique violations to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_or_db(err: DbErr, what: &str) -> StockError {
    if is_unique_violation(&err) {
        StockError::Conflict(format!("{what} already exists"))
    } else {
        db_err(err)
    }
}
