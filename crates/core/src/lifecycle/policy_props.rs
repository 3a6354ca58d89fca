//! Property-based tests for the soft-delete policy.

use proptest::prelude::*;

use crate::lifecycle::policy::tests::Row;
use crate::lifecycle::{Activatable, EntityKind, SoftDeletePolicy};

fn arb_kind() -> impl Strategy<Value = EntityKind> {
    prop_oneof![
        Just(EntityKind::StockBatch),
        Just(EntityKind::Sale),
        Just(EntityKind::SaleItem),
        Just(EntityKind::Supplier),
        Just(EntityKind::Manufacturer),
        Just(EntityKind::Product),
        Just(EntityKind::ProductVariant),
        Just(EntityKind::Category),
        Just(EntityKind::User),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Delete and restore are never both legal for the same row.
    #[test]
    fn prop_delete_and_restore_exclusive(kind in arb_kind(), deleted in any::<bool>(), dependents in 0u64..5) {
        let row = if deleted { Row::deleted() } else { Row::active() };
        let can_delete = SoftDeletePolicy::check_delete(kind, &row, dependents).is_ok();
        let can_restore = SoftDeletePolicy::check_restore(kind, &row).is_ok();
        prop_assert!(!(can_delete && can_restore));
    }

    /// A deleted row can never be deleted again, whatever its dependents.
    #[test]
    fn prop_deleted_rows_reject_delete(kind in arb_kind(), dependents in 0u64..5) {
        let row = Row::deleted();
        let err = SoftDeletePolicy::check_delete(kind, &row, dependents).unwrap_err();
        prop_assert!(err.is_state_error());
    }

    /// Active rows with no live dependents can always be deleted.
    #[test]
    fn prop_active_rows_without_dependents_delete(kind in arb_kind()) {
        let row = Row::active();
        prop_assert!(row.is_active());
        prop_assert!(SoftDeletePolicy::check_delete(kind, &row, 0).is_ok());
    }
}
