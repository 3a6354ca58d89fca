//! FIFO allocation planner.
//!
//! Plans are computed from a snapshot of candidate batches; the store applies
//! them with conditional updates so a stale snapshot surfaces as
//! `ConcurrentModification` instead of an over-allocation.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::allocation::types::{AllocationPlan, AllocationRequest, BatchPortion, CandidateBatch};
use crate::error::StockError;
use crate::sale::{SaleTotals, check_money};

/// Stateless service for planning allocations.
pub struct AllocationService;

impl AllocationService {
    /// Validates the request shape before touching any batch.
    pub fn validate_request(request: &AllocationRequest) -> Result<(), StockError> {
        if request.quantity <= 0 {
            return Err(StockError::Validation(
                "quantity must be greater than zero".to_string(),
            ));
        }
        if request.unit_price <= Decimal::ZERO {
            return Err(StockError::Validation(
                "unit_price must be greater than zero".to_string(),
            ));
        }
        check_money("unit_price", request.unit_price)?;
        Ok(())
    }

    /// FIFO order: oldest `received_at` first, ties broken by batch id.
    #[must_use]
    pub fn fifo_cmp(a: &CandidateBatch, b: &CandidateBatch) -> Ordering {
        a.received_at
            .cmp(&b.received_at)
            .then_with(|| a.batch_id.cmp(&b.batch_id))
    }

    /// Splits `request.quantity` across `candidates` oldest first.
    ///
    /// Batches with nothing remaining are skipped. Fails without producing a
    /// plan when:
    /// - the candidates hold fewer units than requested (`InsufficientStock`)
    /// - the unit price is below the floor of any batch the split draws
    ///   from (`PriceBelowMinimum`)
    ///
    /// Partial allocations are never returned.
    pub fn plan(
        request: &AllocationRequest,
        mut candidates: Vec<CandidateBatch>,
    ) -> Result<AllocationPlan, StockError> {
        Self::validate_request(request)?;

        candidates.retain(|c| c.quantity_remaining > 0);
        candidates.sort_by(Self::fifo_cmp);

        let requested = i64::from(request.quantity);
        let available: i64 = candidates
            .iter()
            .map(|c| i64::from(c.quantity_remaining))
            .sum();
        if available < requested {
            return Err(StockError::InsufficientStock {
                requested,
                available,
            });
        }

        let mut outstanding = request.quantity;
        let mut portions = Vec::new();
        for candidate in &candidates {
            if outstanding == 0 {
                break;
            }
            if request.unit_price < candidate.min_sale_price_per_unit {
                return Err(StockError::PriceBelowMinimum {
                    batch_id: candidate.batch_id,
                    unit_price: request.unit_price,
                    minimum: candidate.min_sale_price_per_unit,
                });
            }
            let take = outstanding.min(candidate.quantity_remaining);
            portions.push(BatchPortion {
                batch_id: candidate.batch_id,
                quantity: take,
            });
            outstanding -= take;
        }

        Ok(AllocationPlan {
            portions,
            quantity: request.quantity,
            unit_price: request.unit_price,
            line_total: SaleTotals::line_total(request.quantity, request.unit_price)?,
        })
    }
}
