//! Ledger aggregation
//!
//! Replays posted journal lines into per-account movement histories with
//! running balances, and sums them into a trial balance. Voided entries and
//! drafts never contribute.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use core_kernel::{AccountId, DateRange, JournalEntryId, Money};
use domain_ledger::chart::ChartOfAccounts;
use domain_ledger::error::LedgerError;
use domain_ledger::journal::{signed_amount, JournalStore};

/// One posted line on an account, with the balance after applying it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    /// Entry the line belongs to
    pub entry_id: JournalEntryId,
    /// The entry's posted number
    pub entry_number: u64,
    /// Accounting date of the entry
    pub date: NaiveDate,
    /// Line order within the entry
    pub line_number: u32,
    /// Entry-level description
    pub entry_description: String,
    /// Line-level description, if any
    pub line_description: Option<String>,
    /// Debit amount of the line
    pub debit: Money,
    /// Credit amount of the line
    pub credit: Money,
    /// Balance after this movement, signed per the account's normal side
    pub running_balance: Money,
}

/// Per-account totals over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountTotals {
    pub total_debit: Money,
    pub total_credit: Money,
    /// Balance at the end of the range, signed per the normal side
    pub ending_balance: Money,
}

/// Trial balance over a date range
///
/// The global double-entry invariant holds for any range: the grand debit
/// total equals the grand credit total, independent of per-account signs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    pub range: DateRange,
    pub accounts: BTreeMap<AccountId, AccountTotals>,
    pub total_debit: Money,
    pub total_credit: Money,
}

impl TrialBalance {
    /// True when the grand totals match
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// Read-side aggregator over the posted journal
///
/// Borrows the chart and journal; holds no state. Every query is a pure
/// function of committed posted entries: re-invoking with the same arguments
/// reproduces the identical sequence.
pub struct LedgerAggregator<'a> {
    chart: &'a ChartOfAccounts,
    journal: &'a JournalStore,
}

impl<'a> LedgerAggregator<'a> {
    pub fn new(chart: &'a ChartOfAccounts, journal: &'a JournalStore) -> Self {
        Self { chart, journal }
    }

    /// Movement history of one account within a range
    ///
    /// Ordered by (date, entry number, line number), with a running balance
    /// computed per the account type's normal side.
    pub fn account_movements(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Vec<Movement>, LedgerError> {
        let account = self
            .chart
            .get(account_id)
            .ok_or_else(|| LedgerError::not_found(format!("account {account_id}")))?;
        let debit_normal = account.account_type.is_debit_normal();
        let currency = self.journal.currency();

        let mut running = Money::zero(currency);
        let mut movements = Vec::new();

        // posted_entries is already ordered by (date, entry number).
        for entry in self.journal.posted_entries() {
            if !range.contains(entry.date) {
                continue;
            }
            for line in &entry.lines {
                if line.account_id != account_id {
                    continue;
                }
                running = Money::new(
                    running.amount() + signed_amount(line, debit_normal),
                    currency,
                );
                movements.push(Movement {
                    entry_id: entry.id,
                    entry_number: entry.entry_number.unwrap_or_default(),
                    date: entry.date,
                    line_number: line.line_number,
                    entry_description: entry.description.clone(),
                    line_description: line.description.clone(),
                    debit: line.debit,
                    credit: line.credit,
                    running_balance: running,
                });
            }
        }

        Ok(movements)
    }

    /// Ending balance of one account over a range
    pub fn account_balance(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Money, LedgerError> {
        let movements = self.account_movements(account_id, range)?;
        Ok(movements
            .last()
            .map(|m| m.running_balance)
            .unwrap_or_else(|| Money::zero(self.journal.currency())))
    }

    /// Accounts that have at least one posted line in the range
    ///
    /// Grouped from posted lines, not a chart scan, so reports skip
    /// movement-free accounts.
    pub fn accounts_with_movements(&self, range: DateRange) -> BTreeSet<AccountId> {
        let mut seen = BTreeSet::new();
        for entry in self.journal.posted_entries() {
            if !range.contains(entry.date) {
                continue;
            }
            for line in &entry.lines {
                seen.insert(line.account_id);
            }
        }
        seen
    }

    /// Per-account debit/credit totals and ending balances over a range
    pub fn trial_balance(&self, range: DateRange) -> Result<TrialBalance, LedgerError> {
        let currency = self.journal.currency();
        let mut accounts: BTreeMap<AccountId, AccountTotals> = BTreeMap::new();
        let mut total_debit = Money::zero(currency);
        let mut total_credit = Money::zero(currency);

        for entry in self.journal.posted_entries() {
            if !range.contains(entry.date) {
                continue;
            }
            for line in &entry.lines {
                let account = self.chart.get(line.account_id).ok_or_else(|| {
                    LedgerError::not_found(format!("account {}", line.account_id))
                })?;
                let debit_normal = account.account_type.is_debit_normal();

                let totals = accounts.entry(line.account_id).or_insert(AccountTotals {
                    total_debit: Money::zero(currency),
                    total_credit: Money::zero(currency),
                    ending_balance: Money::zero(currency),
                });
                totals.total_debit = totals.total_debit.checked_add(&line.debit)?;
                totals.total_credit = totals.total_credit.checked_add(&line.credit)?;
                totals.ending_balance = Money::new(
                    totals.ending_balance.amount() + signed_amount(line, debit_normal),
                    currency,
                );

                total_debit = total_debit.checked_add(&line.debit)?;
                total_credit = total_credit.checked_add(&line.credit)?;
            }
        }

        tracing::debug!(
            %range,
            accounts = accounts.len(),
            total_debit = %total_debit,
            "trial balance computed"
        );
        Ok(TrialBalance {
            range,
            accounts,
            total_debit,
            total_credit,
        })
    }
}
