//! Reversal service for deleting sale items.
//!
//! Reversing a sale item returns every allocated unit to the batch it came
//! from and takes the line out of the sale total. Allocation rows stay behind
//! as the audit trail.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::StockError;
use crate::lifecycle::Activatable;
use crate::sale::SaleTotals;

/// A recorded `sale_item_batch_allocations` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedAllocation {
    /// Batch the units were drawn from.
    pub batch_id: Uuid,
    /// Units drawn.
    pub quantity_from_batch: i32,
}

/// Input for reversing a sale item.
#[derive(Debug, Clone)]
pub struct ReversalInput {
    /// The sale item being reversed.
    pub sale_item_id: Uuid,
    /// Units sold on the item.
    pub quantity_sold: i32,
    /// Unit price at sale time.
    pub price_at_sale: Decimal,
    /// Allocations recorded for the item.
    pub allocations: Vec<RecordedAllocation>,
}

/// Units to return to one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRestoration {
    /// The batch.
    pub batch_id: Uuid,
    /// Units to add back to `quantity_remaining`.
    pub quantity: i32,
}

/// Output of planning a reversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversalPlan {
    /// One restoration per distinct batch, ordered by batch id.
    pub restorations: Vec<BatchRestoration>,
    /// Amount to subtract from the sale total.
    pub total_decrement: Decimal,
}

/// Stateless service for planning reversals.
pub struct ReversalService;

impl ReversalService {
    /// Rejects items that were already reversed.
    pub fn ensure_reversible<E: Activatable + ?Sized>(item: &E) -> Result<(), StockError> {
        if item.is_active() {
            Ok(())
        } else {
            Err(StockError::AlreadyReversed(item.id()))
        }
    }

    /// Validates that the allocations add up to the quantity sold.
    ///
    /// Always true for items written by the allocation engine.
    #[must_use]
    pub fn validate_reversal(allocations: &[RecordedAllocation], quantity_sold: i32) -> bool {
        let total: i64 = allocations
            .iter()
            .map(|a| i64::from(a.quantity_from_batch))
            .sum();
        total == i64::from(quantity_sold) && allocations.iter().all(|a| a.quantity_from_batch > 0)
    }

    /// Builds the restorations and sale-total decrement for `input`.
    ///
    /// Allocations drawing from the same batch are merged so each batch is
    /// updated once; restorations are ordered by batch id so concurrent
    /// reversals lock batches in the same order.
    pub fn plan(input: &ReversalInput) -> Result<ReversalPlan, StockError> {
        if !Self::validate_reversal(&input.allocations, input.quantity_sold) {
            return Err(StockError::Internal(format!(
                "allocations of sale item {} do not add up to quantity sold {}",
                input.sale_item_id, input.quantity_sold
            )));
        }

        let mut per_batch: BTreeMap<Uuid, i32> = BTreeMap::new();
        for allocation in &input.allocations {
            *per_batch.entry(allocation.batch_id).or_insert(0) += allocation.quantity_from_batch;
        }

        Ok(ReversalPlan {
            restorations: per_batch
                .into_iter()
                .map(|(batch_id, quantity)| BatchRestoration { batch_id, quantity })
                .collect(),
            total_decrement: SaleTotals::line_total(input.quantity_sold, input.price_at_sale)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::policy::tests::Row;
    use rust_decimal_macros::dec;

    fn input(allocations: Vec<RecordedAllocation>, quantity_sold: i32) -> ReversalInput {
        ReversalInput {
            sale_item_id: Uuid::new_v4(),
            quantity_sold,
            price_at_sale: dec!(20.00),
            allocations,
        }
    }

    #[test]
    fn test_plan_restores_each_batch() {
        let b1 = Uuid::from_u128(1);
        let b2 = Uuid::from_u128(2);
        let plan = ReversalService::plan(&input(
            vec![
                RecordedAllocation {
                    batch_id: b2,
                    quantity_from_batch: 2,
                },
                RecordedAllocation {
                    batch_id: b1,
                    quantity_from_batch: 3,
                },
            ],
            5,
        ))
        .unwrap();

        assert_eq!(
            plan.restorations,
            vec![
                BatchRestoration {
                    batch_id: b1,
                    quantity: 3
                },
                BatchRestoration {
                    batch_id: b2,
                    quantity: 2
                },
            ]
        );
        assert_eq!(plan.total_decrement, dec!(100.00));
    }

    #[test]
    fn test_plan_merges_same_batch() {
        let b1 = Uuid::new_v4();
        let plan = ReversalService::plan(&input(
            vec![
                RecordedAllocation {
                    batch_id: b1,
                    quantity_from_batch: 1,
                },
                RecordedAllocation {
                    batch_id: b1,
                    quantity_from_batch: 4,
                },
            ],
            5,
        ))
        .unwrap();
        assert_eq!(plan.restorations.len(), 1);
        assert_eq!(plan.restorations[0].quantity, 5);
    }

    #[test]
    fn test_plan_rejects_mismatched_allocations() {
        let err = ReversalService::plan(&input(
            vec![RecordedAllocation {
                batch_id: Uuid::new_v4(),
                quantity_from_batch: 2,
            }],
            5,
        ))
        .unwrap_err();
        assert!(matches!(err, StockError::Internal(_)));
    }

    #[test]
    fn test_validate_reversal_empty() {
        assert!(!ReversalService::validate_reversal(&[], 1));
        // An item with no quantity has nothing to restore
        assert!(ReversalService::validate_reversal(&[], 0));
    }

    #[test]
    fn test_ensure_reversible() {
        assert!(ReversalService::ensure_reversible(&Row::active()).is_ok());

        let reversed = Row::deleted();
        let err = ReversalService::ensure_reversible(&reversed).unwrap_err();
        assert!(matches!(err, StockError::AlreadyReversed(id) if id == reversed.id));
    }
}
