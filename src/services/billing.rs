//! Rental pricing.
//!
//! A rental is billed per started month: whole months elapsed between the
//! start and end dates, plus one more when the end date reaches or passes the
//! start's day of month. Reversed or equal dates bill nothing.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Number of billable months between `start` and `end`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }

    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() >= start.day() {
        months += 1;
    }

    u32::try_from(months).unwrap_or(0)
}

/// `months_between(start, end) × monthly_price`, or `None` when the product
/// does not fit a `Decimal`.
pub fn total_amount(start: NaiveDate, end: NaiveDate, monthly_price: Decimal) -> Option<Decimal> {
    Decimal::from(months_between(start, end)).checked_mul(monthly_price)
}
