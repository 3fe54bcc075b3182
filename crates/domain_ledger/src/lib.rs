//! Ledger Domain - Double-Entry General Ledger Engine
//!
//! This crate implements the write side of a strict double-entry bookkeeping
//! system: the chart of accounts, the journal entry store with its posting
//! lifecycle, and the template engine that turns business events into
//! balanced journal entries.
//!
//! # Double-Entry Accounting Principles
//!
//! Every posted journal entry is balanced:
//! - Debits increase asset/expense accounts
//! - Credits increase liability/equity/income accounts
//! - The sum of all debits must equal the sum of all credits, exactly
//!
//! # Lifecycle
//!
//! Entries are created as DRAFT or directly POSTED. Drafts may be edited or
//! deleted; posted entries are immutable and can only be voided. Voided
//! entries keep their lines and entry number but no longer contribute to
//! balances.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{GeneralLedger, PostingMode, TriggerContext, TriggerType};
//!
//! let ledger = GeneralLedger::new(Currency::EUR);
//! // seed accounts and templates, then:
//! let context = TriggerContext::new(Currency::EUR)
//!     .with_subtotal(dec!(1000))
//!     .with_tax(dec!(210))
//!     .with_total(dec!(1210));
//! let entry = ledger.generate_and_post(
//!     TriggerType::SaleInvoice, date, &context, PostingMode::Posted,
//! )?;
//! ```

pub mod chart;
pub mod engine;
pub mod error;
pub mod journal;
pub mod template;

pub use chart::{Account, AccountPatch, AccountSpec, AccountType, ChartOfAccounts};
pub use engine::{AccountRemoval, GeneralLedger};
pub use error::LedgerError;
pub use journal::{
    EntryPatch, EntryStatus, JournalEntry, JournalEntryLine, JournalStore, PostingMode,
    ProposedEntry,
};
pub use template::{
    AmountType, EntryTemplate, Side, TemplateEngine, TemplateLine, TemplateRegistry, TemplateSpec,
    TriggerContext, TriggerType,
};
