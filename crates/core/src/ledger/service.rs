//! Ledger validation and quantity transitions.

use rust_decimal::Decimal;

use crate::error::StockError;
use crate::ledger::types::{BatchLevel, NewStockBatch};
use crate::sale::check_money;

/// Stateless service for ledger rules.
pub struct LedgerService;

impl LedgerService {
    /// Validates a batch before it is received.
    ///
    /// Rules:
    /// - `quantity_received > 0`
    /// - `buy_price_per_unit >= 0`
    /// - `sell_price_per_unit > 0`
    /// - `0 < min_sale_price_per_unit <= sell_price_per_unit`
    /// - every price fits a money column
    pub fn validate_new_batch(input: &NewStockBatch) -> Result<(), StockError> {
        if input.quantity_received <= 0 {
            return Err(StockError::Validation(
                "quantity_received must be greater than zero".to_string(),
            ));
        }
        check_money("buy_price_per_unit", input.buy_price_per_unit)?;
        check_money("sell_price_per_unit", input.sell_price_per_unit)?;
        check_money("min_sale_price_per_unit", input.min_sale_price_per_unit)?;
        if input.buy_price_per_unit < Decimal::ZERO {
            return Err(StockError::Validation(
                "buy_price_per_unit cannot be negative".to_string(),
            ));
        }
        if input.sell_price_per_unit <= Decimal::ZERO {
            return Err(StockError::Validation(
                "sell_price_per_unit must be greater than zero".to_string(),
            ));
        }
        if input.min_sale_price_per_unit <= Decimal::ZERO {
            return Err(StockError::Validation(
                "min_sale_price_per_unit must be greater than zero".to_string(),
            ));
        }
        if input.min_sale_price_per_unit > input.sell_price_per_unit {
            return Err(StockError::Validation(format!(
                "min_sale_price_per_unit {} exceeds sell_price_per_unit {}",
                input.min_sale_price_per_unit, input.sell_price_per_unit
            )));
        }
        Ok(())
    }

    /// Checks `0 <= remaining <= received` and `received > 0`.
    pub fn check_level(level: &BatchLevel) -> Result<(), StockError> {
        if level.quantity_received <= 0
            || level.quantity_remaining < 0
            || level.quantity_remaining > level.quantity_received
        {
            return Err(StockError::Internal(format!(
                "batch {} out of bounds: remaining {} of {}",
                level.batch_id, level.quantity_remaining, level.quantity_received
            )));
        }
        Ok(())
    }

    /// Level after taking `quantity` units out of the batch.
    ///
    /// Fails with `ConcurrentModification` when the batch no longer holds
    /// enough units, matching the conditional update in the store.
    pub fn decrement(level: BatchLevel, quantity: i32) -> Result<BatchLevel, StockError> {
        if quantity <= 0 {
            return Err(StockError::Validation(
                "allocated quantity must be greater than zero".to_string(),
            ));
        }
        if level.quantity_remaining < quantity {
            return Err(StockError::ConcurrentModification);
        }
        Ok(BatchLevel {
            quantity_remaining: level.quantity_remaining - quantity,
            ..level
        })
    }

    /// Level after returning `quantity` units to the batch.
    pub fn increment(level: BatchLevel, quantity: i32) -> Result<BatchLevel, StockError> {
        if quantity <= 0 {
            return Err(StockError::Validation(
                "restored quantity must be greater than zero".to_string(),
            ));
        }
        match level.quantity_remaining.checked_add(quantity) {
            Some(remaining) if remaining <= level.quantity_received => Ok(BatchLevel {
                quantity_remaining: remaining,
                ..level
            }),
            _ => Err(StockError::ConcurrentModification),
        }
    }
}
