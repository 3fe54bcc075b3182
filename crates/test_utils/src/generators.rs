//! Property-Based Test Data Generators
//!
//! Proptest strategies and fake-data helpers shared across the suite.

use chrono::NaiveDate;
use fake::faker::company::en::{Bs, CompanyName};
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

use crate::fixtures::TEST_CURRENCY;

/// Strategy for positive amounts in minor units (cents)
pub fn minor_amount() -> impl Strategy<Value = i64> {
    1i64..100_000_000
}

/// Strategy for positive Money values in the test currency
pub fn positive_money() -> impl Strategy<Value = Money> {
    minor_amount().prop_map(|minor| Money::from_minor(minor, TEST_CURRENCY))
}

/// Strategy for Money values in a given currency
pub fn money_in(currency: Currency) -> impl Strategy<Value = Money> {
    minor_amount().prop_map(move |minor| Money::from_minor(minor, currency))
}

/// Strategy for accounting dates within 2024
pub fn accounting_date() -> impl Strategy<Value = NaiveDate> {
    (1u32..=12, 1u32..=28).prop_map(|(month, day)| {
        NaiveDate::from_ymd_opt(2024, month, day).expect("day <= 28 is always valid")
    })
}

/// Strategy for a subtotal/tax pair with a consistent total
pub fn subtotal_and_tax() -> impl Strategy<Value = (Decimal, Decimal, Decimal)> {
    (1i64..10_000_000, 0u32..=25).prop_map(|(minor, rate)| {
        let subtotal = Decimal::new(minor, 2);
        let tax = (subtotal * Decimal::from(rate) / Decimal::ONE_HUNDRED).round_dp_with_strategy(
            2,
            rust_decimal::RoundingStrategy::MidpointNearestEven,
        );
        (subtotal, tax, subtotal + tax)
    })
}

/// A plausible counterparty name for entry descriptions
pub fn fake_company_name() -> String {
    CompanyName().fake()
}

/// A plausible free-text entry description
pub fn fake_description() -> String {
    let activity: String = Bs().fake();
    format!("{} - {}", fake_company_name(), activity)
}
