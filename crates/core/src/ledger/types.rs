//! Ledger domain types.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input for receiving a new stock batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStockBatch {
    /// Variant the units belong to.
    pub product_variant_id: Uuid,
    /// Supplier the batch was bought from.
    pub supplier_id: Option<Uuid>,
    /// Units received. Immutable once created.
    pub quantity_received: i32,
    /// Cost per unit.
    pub buy_price_per_unit: Decimal,
    /// List price per unit.
    pub sell_price_per_unit: Decimal,
    /// Floor below which units of this batch may not be sold.
    pub min_sale_price_per_unit: Decimal,
    /// When the goods arrived. Drives FIFO order.
    pub received_at: DateTime<FixedOffset>,
}

/// Received and remaining quantity of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLevel {
    /// The batch.
    pub batch_id: Uuid,
    /// Units received.
    pub quantity_received: i32,
    /// Units not yet allocated to an active sale item.
    pub quantity_remaining: i32,
}

impl BatchLevel {
    /// Level of a freshly received batch.
    #[must_use]
    pub const fn fresh(batch_id: Uuid, quantity_received: i32) -> Self {
        Self {
            batch_id,
            quantity_received,
            quantity_remaining: quantity_received,
        }
    }

    /// Units currently allocated to active sale items.
    #[must_use]
    pub const fn quantity_allocated(&self) -> i32 {
        self.quantity_received - self.quantity_remaining
    }
}
