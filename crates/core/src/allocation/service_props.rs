//! Property-based tests for the FIFO allocation planner.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::allocation::{AllocationRequest, AllocationService, CandidateBatch};
use crate::error::StockError;

/// Strategy for generating candidate batches with a uniform price floor.
fn arb_candidates() -> impl Strategy<Value = Vec<CandidateBatch>> {
    prop::collection::vec((any::<u128>(), 0i64..30, 0i32..50), 0..8).prop_map(|rows| {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        rows.into_iter()
            .map(|(id, day, remaining)| CandidateBatch {
                batch_id: Uuid::from_u128(id),
                received_at: (base + Duration::days(day)).fixed_offset(),
                quantity_remaining: remaining,
                min_sale_price_per_unit: Decimal::ONE,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Σ portions = requested, each portion fits its batch.
    #[test]
    fn prop_plan_conserves_quantity(candidates in arb_candidates(), quantity in 1i32..200) {
        let available: i64 = candidates.iter().map(|c| i64::from(c.quantity_remaining)).sum();
        let request = AllocationRequest { quantity, unit_price: Decimal::TEN };

        match AllocationService::plan(&request, candidates.clone()) {
            Ok(plan) => {
                prop_assert_eq!(plan.allocated(), i64::from(quantity));
                for portion in &plan.portions {
                    prop_assert!(portion.quantity > 0);
                    let source = candidates.iter().find(|c| c.batch_id == portion.batch_id).unwrap();
                    prop_assert!(portion.quantity <= source.quantity_remaining);
                }
                prop_assert_eq!(plan.line_total, Decimal::from(quantity) * Decimal::TEN);
            }
            Err(StockError::InsufficientStock { requested, available: reported }) => {
                prop_assert_eq!(requested, i64::from(quantity));
                prop_assert_eq!(reported, available);
                prop_assert!(available < i64::from(quantity));
            }
            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }

    /// Every batch before the last touched one is drained completely.
    #[test]
    fn prop_plan_is_fifo(candidates in arb_candidates(), quantity in 1i32..200) {
        let request = AllocationRequest { quantity, unit_price: Decimal::TEN };
        if let Ok(plan) = AllocationService::plan(&request, candidates.clone()) {
            let mut ordered: Vec<_> = candidates.into_iter().filter(|c| c.quantity_remaining > 0).collect();
            ordered.sort_by(AllocationService::fifo_cmp);

            for (i, portion) in plan.portions.iter().enumerate() {
                prop_assert_eq!(portion.batch_id, ordered[i].batch_id);
                if i + 1 < plan.portions.len() {
                    prop_assert_eq!(portion.quantity, ordered[i].quantity_remaining);
                }
            }
        }
    }

    /// A price under every floor never produces a plan.
    #[test]
    fn prop_price_below_floor_never_plans(candidates in arb_candidates(), quantity in 1i32..50) {
        let request = AllocationRequest { quantity, unit_price: Decimal::new(1, 2) };
        prop_assert!(AllocationService::plan(&request, candidates).is_err());
    }
}
