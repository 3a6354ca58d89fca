//! Property-based tests for reversal planning.
//!
//! Allocation followed by reversal must return every batch and the sale total
//! to where they started.

use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::allocation::{AllocationRequest, AllocationService, CandidateBatch};
use crate::reversal::{RecordedAllocation, ReversalInput, ReversalService};
use crate::sale::{SaleLine, SaleTotals};

fn arb_candidates() -> impl Strategy<Value = Vec<CandidateBatch>> {
    prop::collection::vec((0i64..10, 1i32..40), 1..6).prop_map(|rows| {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(i, (day, remaining))| CandidateBatch {
                batch_id: Uuid::from_u128(i as u128 + 1),
                received_at: (base + Duration::days(day)).fixed_offset(),
                quantity_remaining: remaining,
                min_sale_price_per_unit: Decimal::ONE,
            })
            .collect()
    })
}

/// Prices at full storage precision, 1.0000 to 999.9999.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (10_000i64..10_000_000).prop_map(|n| Decimal::new(n, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reversing an allocation restores every batch and the sale total.
    #[test]
    fn prop_allocate_then_reverse_round_trips(
        candidates in arb_candidates(),
        quantity in 1i32..100,
        price in arb_price(),
        prior_total in arb_price(),
    ) {
        let request = AllocationRequest { quantity, unit_price: price };
        let Ok(plan) = AllocationService::plan(&request, candidates.clone()) else {
            return Ok(());
        };

        let mut levels: HashMap<Uuid, i32> =
            candidates.iter().map(|c| (c.batch_id, c.quantity_remaining)).collect();
        for portion in &plan.portions {
            *levels.get_mut(&portion.batch_id).unwrap() -= portion.quantity;
        }
        let line = SaleLine { quantity_sold: quantity, price_at_sale: price };
        let total_after_sale = SaleTotals::after_addition(prior_total, &line).unwrap();
        prop_assert_eq!(total_after_sale - prior_total, plan.line_total);

        let reversal = ReversalService::plan(&ReversalInput {
            sale_item_id: Uuid::new_v4(),
            quantity_sold: quantity,
            price_at_sale: price,
            allocations: plan
                .portions
                .iter()
                .map(|p| RecordedAllocation { batch_id: p.batch_id, quantity_from_batch: p.quantity })
                .collect(),
        })
        .unwrap();

        for restoration in &reversal.restorations {
            *levels.get_mut(&restoration.batch_id).unwrap() += restoration.quantity;
        }

        for candidate in &candidates {
            prop_assert_eq!(levels[&candidate.batch_id], candidate.quantity_remaining);
        }
        prop_assert_eq!(reversal.total_decrement, plan.line_total);
        prop_assert_eq!(SaleTotals::after_removal(total_after_sale, &line).unwrap(), prior_total);
    }

    /// Restored quantities always sum to the quantity sold.
    #[test]
    fn prop_restorations_sum_to_quantity_sold(
        parts in prop::collection::vec((0u128..4, 1i32..20), 1..8),
    ) {
        let allocations: Vec<_> = parts
            .iter()
            .map(|(b, q)| RecordedAllocation { batch_id: Uuid::from_u128(*b), quantity_from_batch: *q })
            .collect();
        let quantity_sold: i32 = parts.iter().map(|(_, q)| q).sum();

        let plan = ReversalService::plan(&ReversalInput {
            sale_item_id: Uuid::nil(),
            quantity_sold,
            price_at_sale: Decimal::ONE,
            allocations,
        })
        .unwrap();

        let restored: i32 = plan.restorations.iter().map(|r| r.quantity).sum();
        prop_assert_eq!(restored, quantity_sold);
        prop_assert!(plan.restorations.windows(2).all(|w| w[0].batch_id < w[1].batch_id));
    }
}
