//! Open Ledger Core - double-entry general-ledger engine
//!
//! Facade crate re-exporting the engine's public surface:
//! - [`core_kernel`]: Money, identifiers, date ranges
//! - [`domain_ledger`]: chart of accounts, journal entry store, template engine
//! - [`domain_reporting`]: ledger aggregation and financial statements

pub use core_kernel;
pub use domain_ledger;
pub use domain_reporting;

pub use core_kernel::{Currency, DateRange, Money};
pub use domain_ledger::{
    ChartOfAccounts, GeneralLedger, JournalStore, LedgerError, PostingMode, TemplateEngine,
    TemplateRegistry, TriggerContext, TriggerType,
};
pub use domain_reporting::{LedgerAggregator, StatementBuilder};
