//! Ledger domain errors
//!
//! Every error here is a local, recoverable-by-caller condition. The engine
//! never retries internally and never coerces invalid input into something
//! postable (no plug lines).

use core_kernel::{JournalEntryId, MoneyError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::journal::EntryStatus;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Structural validation failed (too few lines, bad code, negative
    /// amount, both sides of a line set, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A posted entry's debits do not equal its credits
    #[error("Unbalanced entry: debits={debits}, credits={credits}, difference={difference}")]
    UnbalancedEntry {
        debits: Decimal,
        credits: Decimal,
        /// Signed difference, debits minus credits
        difference: Decimal,
    },

    /// A template resolved to an unbalanced set of lines
    #[error("Template {template} resolved to an unbalanced entry: debits={debits}, credits={credits}, difference={difference}")]
    UnbalancedTemplate {
        template: String,
        debits: Decimal,
        credits: Decimal,
        /// Signed difference, debits minus credits
        difference: Decimal,
    },

    /// A line references an account that does not accept direct postings
    #[error("Account {code} does not accept direct postings (line {line_number})")]
    NonPostableAccount { line_number: u32, code: String },

    /// A referenced account does not exist in the chart
    #[error("Unknown account: {code}")]
    UnknownAccount { code: String },

    /// A template requires a context field the caller did not supply
    #[error("Template {template} requires context field '{field}'")]
    MissingContextField {
        template: String,
        field: &'static str,
    },

    /// The requested state transition is not allowed
    #[error("Invalid transition: cannot {action} a {status} entry {entry}")]
    InvalidTransition {
        entry: JournalEntryId,
        status: EntryStatus,
        action: &'static str,
    },

    /// Attempted to edit a posted entry
    #[error("Posted entry {0} is immutable")]
    ImmutableEntry(JournalEntryId),

    /// The requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Monetary arithmetic failed (currency mismatch)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        LedgerError::NotFound(message.into())
    }

    pub fn unbalanced_entry(debits: Decimal, credits: Decimal) -> Self {
        LedgerError::UnbalancedEntry {
            debits,
            credits,
            difference: debits - credits,
        }
    }

    pub fn unbalanced_template(template: impl Into<String>, debits: Decimal, credits: Decimal) -> Self {
        LedgerError::UnbalancedTemplate {
            template: template.into(),
            debits,
            credits,
            difference: debits - credits,
        }
    }
}
