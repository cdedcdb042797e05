//! Money amounts: two decimal places, stored in `NUMERIC(10, 2)` columns.

use rust_decimal::Decimal;
use serde::Serializer;

/// Largest number of fractional digits an amount may carry.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound on the magnitude of any stored amount (10^8).
pub fn money_limit() -> Decimal {
    Decimal::from(100_000_000u64)
}

/// Why an amount does not fit the money columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyViolation {
    TooPrecise,
    TooLarge,
}

/// Checks that `value` fits `NUMERIC(10, 2)` without rounding.
pub fn check_money(value: &Decimal) -> Result<(), MoneyViolation> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(MoneyViolation::TooPrecise);
    }
    if value.abs() >= money_limit() {
        return Err(MoneyViolation::TooLarge);
    }
    Ok(())
}

/// Renders an amount with exactly two decimal places, e.g. `199.90`.
pub fn format_money(value: &Decimal) -> String {
    let mut rounded = value.round_dp(MONEY_SCALE);
    rounded.rescale(MONEY_SCALE);
    rounded.to_string()
}

/// `serialize_with` hook for money fields.
pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_money(value))
}
