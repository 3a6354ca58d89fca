//! Property-based tests for ledger quantity transitions.

use proptest::prelude::*;
use uuid::Uuid;

use crate::ledger::{BatchLevel, LedgerService};

fn arb_level() -> impl Strategy<Value = BatchLevel> {
    (1i32..10_000).prop_flat_map(|received| {
        (0..=received).prop_map(move |remaining| BatchLevel {
            batch_id: Uuid::nil(),
            quantity_received: received,
            quantity_remaining: remaining,
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any successful transition keeps `0 <= remaining <= received`.
    #[test]
    fn prop_transitions_stay_in_bounds(level in arb_level(), n in 1i32..20_000, up in any::<bool>()) {
        let result = if up {
            LedgerService::increment(level, n)
        } else {
            LedgerService::decrement(level, n)
        };
        if let Ok(next) = result {
            prop_assert!(LedgerService::check_level(&next).is_ok());
            prop_assert_eq!(next.quantity_received, level.quantity_received);
        }
    }

    /// Decrement then increment by the same amount restores the level.
    #[test]
    fn prop_decrement_increment_round_trip(level in arb_level(), n in 1i32..10_000) {
        prop_assume!(n <= level.quantity_remaining);
        let down = LedgerService::decrement(level, n).unwrap();
        let up = LedgerService::increment(down, n).unwrap();
        prop_assert_eq!(up, level);
    }

    /// Decrement succeeds exactly when enough units remain.
    #[test]
    fn prop_decrement_requires_remaining(level in arb_level(), n in 1i32..20_000) {
        let ok = LedgerService::decrement(level, n).is_ok();
        prop_assert_eq!(ok, n <= level.quantity_remaining);
    }
}
