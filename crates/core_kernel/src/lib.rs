//! Core Kernel - Foundational types and utilities for the ledger engine
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Date ranges for report queries and cutoffs
//! - Common identifiers and value objects

pub mod error;
pub mod identifiers;
pub mod money;
pub mod temporal;

pub use error::CoreError;
pub use identifiers::{AccountId, JournalEntryId, JournalLineId, TemplateId};
pub use money::{Currency, Money, MoneyError, Rate};
pub use temporal::{DateRange, TemporalError};
