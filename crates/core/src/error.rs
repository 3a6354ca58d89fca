//! Stock error taxonomy.
//!
//! Every failure the ledger, allocation engine, reversal service, SKU
//! generator and soft-delete lifecycle can produce. Each variant carries a
//! stable machine code and an HTTP status.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using `StockError`.
pub type StockResult<T> = Result<T, StockError>;

/// Errors that can occur during stock operations.
#[derive(Debug, Error)]
pub enum StockError {
    // ========== Validation Errors ==========
    /// Input failed a field-level rule.
    #[error("Validation error: {0}")]
    Validation(String),

    // ========== Lookup Errors ==========
    /// Referenced entity does not exist or is not active.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"sale"`.
        entity: &'static str,
        /// The id that was looked up.
        id: Uuid,
    },

    // ========== Allocation Errors ==========
    /// Active batches of the variant cannot cover the request.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Units requested.
        requested: i64,
        /// Units available across all candidate batches.
        available: i64,
    },

    /// Unit price is below a drawn batch's minimum sale price.
    #[error("Unit price {unit_price} is below minimum {minimum} of batch {batch_id}")]
    PriceBelowMinimum {
        /// The batch whose floor was violated.
        batch_id: Uuid,
        /// The offered unit price.
        unit_price: Decimal,
        /// The batch's minimum sale price per unit.
        minimum: Decimal,
    },

    // ========== Conflict Errors ==========
    /// Uniqueness could not be established.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A conditional update affected no rows; safe to retry.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== State Errors ==========
    /// The sale item was already reversed.
    #[error("Sale item {0} has already been reversed")]
    AlreadyReversed(Uuid),

    /// The entity still has active dependents.
    #[error("Cannot delete {entity} {id}: {count} active {dependent} remain")]
    HasActiveDependents {
        /// Entity kind being deleted.
        entity: &'static str,
        /// Entity id.
        id: Uuid,
        /// Dependent kind, e.g. `"sale items"`.
        dependent: &'static str,
        /// Number of active dependents.
        count: u64,
    },

    /// Delete requested for an entity that is already deleted.
    #[error("{entity} {id} is already deleted")]
    AlreadyDeleted {
        /// Entity kind.
        entity: &'static str,
        /// Entity id.
        id: Uuid,
    },

    /// Restore requested for an entity that is active.
    #[error("{entity} {id} is not deleted")]
    NotDeleted {
        /// Entity kind.
        entity: &'static str,
        /// Entity id.
        id: Uuid,
    },

    /// Any other invalid lifecycle transition.
    #[error("Invalid state: {0}")]
    State(String),

    // ========== Infrastructure Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StockError {
    /// Shorthand for [`StockError::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::PriceBelowMinimum { .. } => "PRICE_BELOW_MINIMUM",
            Self::Conflict(_) => "CONFLICT",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::HasActiveDependents { .. } => "HAS_ACTIVE_DEPENDENTS",
            Self::AlreadyDeleted { .. } => "ALREADY_DELETED",
            Self::NotDeleted { .. } => "NOT_DELETED",
            Self::State(_) => "INVALID_STATE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::Validation(_) => 400,

            // 404 Not Found
            Self::NotFound { .. } => 404,

            // 409 Conflict - uniqueness, races and lifecycle state
            Self::Conflict(_)
            | Self::ConcurrentModification
            | Self::AlreadyReversed(_)
            | Self::HasActiveDependents { .. }
            | Self::AlreadyDeleted { .. }
            | Self::NotDeleted { .. }
            | Self::State(_) => 409,

            // 422 Unprocessable Entity - well-formed but the ledger can't honour it
            Self::InsufficientStock { .. } | Self::PriceBelowMinimum { .. } => 422,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Whether the operation can be retried in a fresh transaction.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }

    /// Whether this is a lifecycle state error.
    #[must_use]
    pub const fn is_state_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyReversed(_)
                | Self::HasActiveDependents { .. }
                | Self::AlreadyDeleted { .. }
                | Self::NotDeleted { .. }
                | Self::State(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(StockError::Validation("x".into()), 400, "VALIDATION_ERROR")]
    #[case(StockError::not_found("sale", Uuid::nil()), 404, "NOT_FOUND")]
    #[case(StockError::InsufficientStock { requested: 5, available: 3 }, 422, "INSUFFICIENT_STOCK")]
    #[case(
        StockError::PriceBelowMinimum { batch_id: Uuid::nil(), unit_price: dec!(1), minimum: dec!(2) },
        422,
        "PRICE_BELOW_MINIMUM"
    )]
    #[case(StockError::Conflict("sku".into()), 409, "CONFLICT")]
    #[case(StockError::ConcurrentModification, 409, "CONCURRENT_MODIFICATION")]
    #[case(StockError::AlreadyReversed(Uuid::nil()), 409, "ALREADY_REVERSED")]
    #[case(StockError::State("x".into()), 409, "INVALID_STATE")]
    #[case(StockError::Database("x".into()), 500, "DATABASE_ERROR")]
    #[case(StockError::Internal("x".into()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] err: StockError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.http_status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_only_concurrent_modification_is_retryable() {
        assert!(StockError::ConcurrentModification.is_retryable());
        assert!(!StockError::Conflict(String::new()).is_retryable());
        assert!(!StockError::Database(String::new()).is_retryable());
    }

    #[test]
    fn test_state_errors() {
        let id = Uuid::nil();
        assert!(StockError::AlreadyReversed(id).is_state_error());
        assert!(StockError::AlreadyDeleted { entity: "sale", id }.is_state_error());
        assert!(StockError::NotDeleted { entity: "sale", id }.is_state_error());
        assert!(
            StockError::HasActiveDependents {
                entity: "sale",
                id,
                dependent: "sale items",
                count: 1
            }
            .is_state_error()
        );
        assert!(!StockError::InsufficientStock { requested: 1, available: 0 }.is_state_error());
    }

    #[test]
    fn test_display() {
        let err = StockError::InsufficientStock {
            requested: 10,
            available: 4,
        };
        assert_eq!(err.to_string(), "Insufficient stock: requested 10, available 4");

        let err = StockError::not_found("product variant", Uuid::nil());
        assert_eq!(
            err.to_string(),
            "product variant not found: 00000000-0000-0000-0000-000000000000"
        );
    }
}
