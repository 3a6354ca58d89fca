//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs keeps a `SaleId` from being passed where a `SaleItemId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(ProductId, "Unique identifier for a product.");
typed_id!(ProductVariantId, "Unique identifier for a product variant.");
typed_id!(ManufacturerId, "Unique identifier for a manufacturer.");
typed_id!(SupplierId, "Unique identifier for a supplier.");
typed_id!(CategoryId, "Unique identifier for a product category.");
typed_id!(StockBatchId, "Unique identifier for a stock batch.");
typed_id!(SaleId, "Unique identifier for a sale.");
typed_id!(SaleItemId, "Unique identifier for a sale item.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_v7() {
        let id = StockBatchId::new();
        assert_eq!(id.into_inner().get_version_num(), 7);
        assert_ne!(id, StockBatchId::new());
    }

    #[test]
    fn test_parse_and_display() {
        let id = SaleItemId::new();
        let parsed: SaleItemId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<SaleId>().is_err());
    }
}
