//! Reporting Domain - Read-Side Ledger Aggregation
//!
//! This crate derives account movement histories, running balances, and
//! financial statements from the posted journal. Everything here is a pure
//! composition over committed POSTED state: no writes, no independent state,
//! and re-running any query against the same posted entries reproduces the
//! identical result.
//!
//! The single sign rule that powers every report: asset and expense balances
//! grow with debits, liability, equity, and income balances grow with
//! credits (each account type's normal balance side).

pub mod aggregator;
pub mod statements;

pub use aggregator::{AccountTotals, LedgerAggregator, Movement, TrialBalance};
pub use statements::{
    BalanceSheet, BalanceSheetTotals, IncomeStatement, IncomeTotals, StatementBuilder,
    StatementLine,
};
