//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about.

use chrono::NaiveDate;
use core_kernel::{AccountId, Currency, Money};
use domain_ledger::journal::ProposedEntry;
use domain_ledger::template::TriggerContext;
use rust_decimal::Decimal;

use crate::fixtures::TEST_CURRENCY;

/// Builder for proposed entries with default date and description
pub struct TestEntryBuilder {
    date: NaiveDate,
    description: String,
    currency: Currency,
    lines: Vec<(AccountId, Decimal, bool)>,
}

impl Default for TestEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEntryBuilder {
    /// Creates a builder dated 2024-06-15 with a generic description
    pub fn new() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid default date"),
            description: "Test entry".to_string(),
            currency: TEST_CURRENCY,
            lines: Vec::new(),
        }
    }

    /// Sets the accounting date
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Sets the description
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the currency
    pub fn in_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Adds a debit line
    pub fn debit(mut self, account_id: AccountId, amount: Decimal) -> Self {
        self.lines.push((account_id, amount, true));
        self
    }

    /// Adds a credit line
    pub fn credit(mut self, account_id: AccountId, amount: Decimal) -> Self {
        self.lines.push((account_id, amount, false));
        self
    }

    /// Builds the proposed entry
    pub fn build(self) -> ProposedEntry {
        let mut entry = ProposedEntry::new(self.date, self.description);
        for (account_id, amount, is_debit) in self.lines {
            let money = Money::new(amount, self.currency);
            entry = if is_debit {
                entry.debit(account_id, money)
            } else {
                entry.credit(account_id, money)
            };
        }
        entry
    }
}

/// Context for a sale invoice: subtotal plus tax
pub fn sale_invoice_context(subtotal: Decimal, tax: Decimal) -> TriggerContext {
    TriggerContext::new(TEST_CURRENCY)
        .with_subtotal(subtotal)
        .with_tax(tax)
        .with_total(subtotal + tax)
}

/// Context for a customer payment where the customer retains part of the total
pub fn customer_payment_context(total: Decimal, retention: Decimal) -> TriggerContext {
    TriggerContext::new(TEST_CURRENCY)
        .with_total(total)
        .with_retention(retention)
        .with_net_payment(total - retention)
}

/// Context for a loan payment split into principal and interest
pub fn loan_payment_context(principal: Decimal, interest: Decimal) -> TriggerContext {
    TriggerContext::new(TEST_CURRENCY)
        .with_principal(principal)
        .with_interest(interest)
        .with_net_payment(principal + interest)
}

/// Context for a salary run: gross pay, employee retention, and the gross as
/// percentage base for employer charges
pub fn salary_payment_context(gross: Decimal, retention: Decimal) -> TriggerContext {
    TriggerContext::new(TEST_CURRENCY)
        .with_total(gross)
        .with_retention(retention)
        .with_net_payment(gross - retention)
        .with_percentage_base(gross)
}
