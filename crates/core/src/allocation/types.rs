//! Allocation domain types.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A batch that may supply units to a sale item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBatch {
    /// The batch.
    pub batch_id: Uuid,
    /// Arrival time, the FIFO key.
    pub received_at: DateTime<FixedOffset>,
    /// Units still available.
    pub quantity_remaining: i32,
    /// Price floor for units drawn from this batch.
    pub min_sale_price_per_unit: Decimal,
}

/// What the caller wants to sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Units needed.
    pub quantity: i32,
    /// Price per unit fixed at sale time.
    pub unit_price: Decimal,
}

/// Units drawn from a single batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPortion {
    /// The batch drawn from.
    pub batch_id: Uuid,
    /// Units taken, always positive.
    pub quantity: i32,
}

/// A complete FIFO split for one sale item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    /// Portions in FIFO order, one per touched batch.
    pub portions: Vec<BatchPortion>,
    /// Total units, equal to the requested quantity.
    pub quantity: i32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// `quantity * unit_price`, the amount added to the sale total.
    pub line_total: Decimal,
}

impl AllocationPlan {
    /// Sum of portion quantities.
    #[must_use]
    pub fn allocated(&self) -> i64 {
        self.portions.iter().map(|p| i64::from(p.quantity)).sum()
    }
}
