//! Property-based tests for rental pricing.
//!
//! These use proptest to check the month rule across a wide range of dates
//! and prices.

use chrono::{Datelike, Months, NaiveDate};
use lockersys_api::services::billing::{months_between, total_amount};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000, 0u32..100).prop_map(|(units, cents)| {
        Decimal::new(units * 100 + i64::from(cents), 2)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn reversed_or_equal_dates_bill_nothing(a in date_strategy(), b in date_strategy()) {
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        prop_assert_eq!(months_between(late, early), 0);
        prop_assert_eq!(months_between(early, early), 0);
    }

    #[test]
    fn a_later_end_never_bills_less(start in date_strategy(), days in 1i64..2000, extra in 1i64..400) {
        let end = start + chrono::Duration::days(days);
        let later = end + chrono::Duration::days(extra);
        prop_assert!(months_between(start, later) >= months_between(start, end));
        prop_assert!(months_between(start, end) >= 1);
    }

    #[test]
    fn one_more_year_is_twelve_more_months(start in date_strategy(), days in 1i64..1500) {
        let end = start + chrono::Duration::days(days);
        let next_year = end.checked_add_months(Months::new(12)).unwrap();
        prop_assume!(next_year.day() == end.day());
        prop_assert_eq!(
            months_between(start, next_year),
            months_between(start, end) + 12
        );
    }

    #[test]
    fn same_day_n_months_later_bills_n_plus_one(start in date_strategy(), n in 1u32..120) {
        let end = start.checked_add_months(Months::new(n)).unwrap();
        prop_assert_eq!(months_between(start, end), n + 1);
    }

    #[test]
    fn total_is_months_times_price(
        start in date_strategy(),
        days in 0i64..3000,
        price in price_strategy(),
    ) {
        let end = start + chrono::Duration::days(days);
        let months = months_between(start, end);
        prop_assert_eq!(total_amount(start, end, price), Some(Decimal::from(months) * price));
    }
}
