//! Sale totals.
//!
//! `Sale.total_amount` is the sum of `quantity_sold * price_at_sale` over the
//! sale's active items. Only allocation and reversal move it.
//!
//! Money columns are `NUMERIC(19, 4)`. Amounts are checked against that shape
//! before they are stored so the database never rounds them.

use rust_decimal::Decimal;

use crate::error::StockError;

/// Decimal places kept by money columns.
pub const MONEY_SCALE: u32 = 4;

/// Integer digits kept by money columns.
const MONEY_INTEGER_DIGITS: u32 = 15;

/// Checks that `value` fits a money column exactly.
///
/// Rejects amounts with more than [`MONEY_SCALE`] significant decimal places
/// and amounts whose magnitude needs more than 15 integer digits.
pub fn check_money(field: &str, value: Decimal) -> Result<(), StockError> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(StockError::Validation(format!(
            "{field} must have at most {MONEY_SCALE} decimal places, got {value}"
        )));
    }
    let limit = Decimal::from(10_i64.pow(MONEY_INTEGER_DIGITS));
    if value.abs() >= limit {
        return Err(StockError::Validation(format!(
            "{field} {value} exceeds the largest storable amount"
        )));
    }
    Ok(())
}

/// A line counted in a sale total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleLine {
    /// Units sold.
    pub quantity_sold: i32,
    /// Unit price at sale time.
    pub price_at_sale: Decimal,
}

/// Stateless helpers for sale totals.
pub struct SaleTotals;

impl SaleTotals {
    /// `quantity * unit_price`, bounded to a storable amount.
    pub fn line_total(quantity: i32, unit_price: Decimal) -> Result<Decimal, StockError> {
        let total = Decimal::from(quantity)
            .checked_mul(unit_price)
            .ok_or_else(|| {
                StockError::Validation(format!("line total of {quantity} x {unit_price} overflows"))
            })?;
        check_money("line total", total)?;
        Ok(total)
    }

    /// Total after adding a line.
    pub fn after_addition(current: Decimal, line: &SaleLine) -> Result<Decimal, StockError> {
        let line_total = Self::line_total(line.quantity_sold, line.price_at_sale)?;
        let next = current.checked_add(line_total).ok_or_else(|| {
            StockError::Validation(format!("sale total {current} + {line_total} overflows"))
        })?;
        check_money("sale total", next)?;
        Ok(next)
    }

    /// Total after removing a line; never goes negative.
    pub fn after_removal(current: Decimal, line: &SaleLine) -> Result<Decimal, StockError> {
        let line_total = Self::line_total(line.quantity_sold, line.price_at_sale)?;
        let next = current - line_total;
        if next < Decimal::ZERO {
            return Err(StockError::Internal(format!(
                "sale total would become negative: {current} - {line_total}"
            )));
        }
        Ok(next)
    }
}
