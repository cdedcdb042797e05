// Registries
pub mod clients;
pub mod lockers;

// Rental ledger and the billing rule it applies
pub mod billing;
pub mod rentals;

// Payments recorded against rentals
pub mod payments;

// Read-side aggregation
pub mod dashboard;

pub mod money;

use rust_decimal::Decimal;
use sea_orm::sea_query::LikeExpr;
use std::borrow::Cow;
use validator::ValidationError;

use self::money::{check_money, MoneyViolation};

/// Page selection after the caller's query string has been coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    /// Items per page, always at least 1
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// True when this page begins at or past the last of `total` rows, so
    /// there is nothing to fetch. Offsets too large to compute count as past.
    pub fn starts_after(&self, total: u64) -> bool {
        (self.page - 1)
            .checked_mul(self.limit)
            .map_or(true, |offset| offset >= total)
    }
}

/// One page of a listing plus the total needed to render pagination.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.limit)
    }
}

/// `ceil(total / limit)`, zero for an empty listing.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// Trims a free-text filter and drops it when nothing is left.
pub(crate) fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Substring `LIKE` pattern with `%`, `_` and `\` in the term matched literally.
pub(crate) fn contains_pattern(term: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

fn decimal_rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects amounts the money columns would round or overflow.
pub(crate) fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    match check_money(value) {
        Ok(()) => Ok(()),
        Err(MoneyViolation::TooPrecise) => Err(decimal_rule(
            "money_scale",
            "Amounts may have at most two decimal places",
        )),
        Err(MoneyViolation::TooLarge) => Err(decimal_rule(
            "money_range",
            "Amounts must be less than 100000000",
        )),
    }
}

pub(crate) fn validate_non_negative_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(decimal_rule("non_negative", "Monthly price cannot be negative"));
    }
    validate_money(value)
}

pub(crate) fn validate_positive_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(decimal_rule("positive", "Monthly price must be greater than zero"));
    }
    validate_money(value)
}

pub(crate) fn validate_non_negative_total(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(decimal_rule("non_negative", "Total amount cannot be negative"));
    }
    validate_money(value)
}

pub(crate) fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(decimal_rule("positive", "Amount must be greater than zero"));
    }
    validate_money(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_rules() {
        assert!(validate_non_negative_price(&dec!(0)).is_ok());
        assert!(validate_non_negative_price(&dec!(-0.01)).is_err());
        assert!(validate_positive_price(&dec!(0)).is_err());
        assert!(validate_positive_price(&dec!(0.01)).is_ok());
        assert!(validate_non_negative_total(&dec!(0)).is_ok());
        assert!(validate_positive_amount(&dec!(-5)).is_err());
    }

    #[test]
    fn decimal_rules_enforce_money_bounds() {
        assert!(validate_positive_price(&dec!(199.90)).is_ok());
        assert!(validate_positive_price(&dec!(199.901)).is_err());
        assert!(validate_non_negative_total(&dec!(100000000)).is_err());
        assert!(validate_positive_amount(&dec!(99999999.99)).is_ok());
    }

    #[test]
    fn pages_past_the_end_are_detected() {
        assert!(!PageRequest::new(1, 10).starts_after(5));
        assert!(PageRequest::new(1, 10).starts_after(0));
        assert!(PageRequest::new(2, 10).starts_after(10));
        assert!(!PageRequest::new(2, 10).starts_after(11));
        assert!(PageRequest::new(u64::MAX, 100).starts_after(3));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 1), 5);
    }

    #[test]
    fn page_request_coerces_to_one() {
        assert_eq!(PageRequest::new(0, 0), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(3, 25), PageRequest { page: 3, limit: 25 });
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(Some(" A0 ")), Some("A0".to_string()));
        assert_eq!(search_term(None), None);
    }
}
