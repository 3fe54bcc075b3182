//! Journal entry store
//!
//! Append-mostly store of journal entries with a lifecycle state machine
//! (`DRAFT -> POSTED -> VOIDED`) and monotonic entry numbering. Entry-number
//! assignment and entry insertion happen inside a single write-lock critical
//! section, so the posted sequence is gap-free and duplicate-free under
//! concurrent callers.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use core_kernel::{AccountId, Currency, JournalEntryId, JournalLineId, Money};

use crate::chart::ChartOfAccounts;
use crate::error::LedgerError;

/// Journal entry lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    /// Editable, not yet contributing to balances
    Draft,
    /// Immutable and balance-contributing
    Posted,
    /// Terminal; lines kept but excluded from balances
    Voided,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryStatus::Draft => "DRAFT",
            EntryStatus::Posted => "POSTED",
            EntryStatus::Voided => "VOIDED",
        };
        write!(f, "{s}")
    }
}

/// How an entry should be persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostingMode {
    /// Persist as an editable draft
    Draft,
    /// Validate fully and post immediately
    Posted,
}

/// A single line of a journal entry
///
/// Exactly one of `debit`/`credit` is positive; the other is exactly zero.
/// The constructors enforce this by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    /// Unique line identifier
    pub id: JournalLineId,
    /// Order within the entry (1-based)
    pub line_number: u32,
    /// Account the line posts to
    pub account_id: AccountId,
    /// Debit amount (zero when the line is a credit)
    pub debit: Money,
    /// Credit amount (zero when the line is a debit)
    pub credit: Money,
    /// Optional description for this line
    pub description: Option<String>,
}

impl JournalEntryLine {
    /// Creates a debit line
    pub fn debit(line_number: u32, account_id: AccountId, amount: Money) -> Self {
        Self {
            id: JournalLineId::new_v7(),
            line_number,
            account_id,
            debit: amount,
            credit: Money::zero(amount.currency()),
            description: None,
        }
    }

    /// Creates a credit line
    pub fn credit(line_number: u32, account_id: AccountId, amount: Money) -> Self {
        Self {
            id: JournalLineId::new_v7(),
            line_number,
            account_id,
            debit: Money::zero(amount.currency()),
            credit: amount,
            description: None,
        }
    }

    /// Adds a description to the line
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True if this line is a debit
    pub fn is_debit(&self) -> bool {
        self.debit.is_positive()
    }

    /// The positive side of the line
    pub fn amount(&self) -> Money {
        if self.is_debit() {
            self.debit
        } else {
            self.credit
        }
    }

    fn validate(&self, currency: Currency) -> Result<(), LedgerError> {
        if self.debit.currency() != currency || self.credit.currency() != currency {
            return Err(LedgerError::validation(format!(
                "line {} carries currency {} but the ledger uses {}",
                self.line_number,
                self.debit.currency(),
                currency
            )));
        }
        if self.debit.is_negative() || self.credit.is_negative() {
            return Err(LedgerError::validation(format!(
                "line {} has a negative amount",
                self.line_number
            )));
        }
        match (self.debit.is_positive(), self.credit.is_positive()) {
            (true, true) => Err(LedgerError::validation(format!(
                "line {} sets both debit and credit",
                self.line_number
            ))),
            (false, false) => Err(LedgerError::validation(format!(
                "line {} sets neither debit nor credit",
                self.line_number
            ))),
            _ => Ok(()),
        }
    }
}

/// A not-yet-persisted journal entry candidate
///
/// Produced by the template engine or built directly by callers, then handed
/// to [`JournalStore::create`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedEntry {
    /// Accounting date of the entry
    pub date: NaiveDate,
    /// Entry description
    pub description: String,
    /// Ordered lines
    pub lines: Vec<JournalEntryLine>,
}

impl ProposedEntry {
    /// Creates an empty candidate
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            date,
            description: description.into(),
            lines: Vec::new(),
        }
    }

    /// Appends a debit line (line numbers are assigned in order)
    pub fn debit(mut self, account_id: AccountId, amount: Money) -> Self {
        let line_number = self.lines.len() as u32 + 1;
        self.lines
            .push(JournalEntryLine::debit(line_number, account_id, amount));
        self
    }

    /// Appends a credit line
    pub fn credit(mut self, account_id: AccountId, amount: Money) -> Self {
        let line_number = self.lines.len() as u32 + 1;
        self.lines
            .push(JournalEntryLine::credit(line_number, account_id, amount));
        self
    }

    /// Appends a prebuilt line
    pub fn line(mut self, line: JournalEntryLine) -> Self {
        self.lines.push(line);
        self
    }
}

/// Patch for draft entries; `lines` replaces the line set wholesale
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub lines: Option<Vec<JournalEntryLine>>,
}

/// A journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique entry identifier
    pub id: JournalEntryId,
    /// Strictly increasing number, assigned at first transition to POSTED
    pub entry_number: Option<u64>,
    /// Accounting date
    pub date: NaiveDate,
    /// Description
    pub description: String,
    /// Lifecycle state
    pub status: EntryStatus,
    /// Ordered lines
    pub lines: Vec<JournalEntryLine>,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
    /// When the entry was posted
    pub posted_at: Option<DateTime<Utc>>,
    /// When the entry was voided
    pub voided_at: Option<DateTime<Utc>>,
    /// Reason supplied at void time
    pub void_reason: Option<String>,
}

impl JournalEntry {
    /// Sum of all debit amounts
    pub fn debit_total(&self, currency: Currency) -> Result<Money, LedgerError> {
        Ok(Money::sum(self.lines.iter().map(|l| &l.debit), currency)?)
    }

    /// Sum of all credit amounts
    pub fn credit_total(&self, currency: Currency) -> Result<Money, LedgerError> {
        Ok(Money::sum(self.lines.iter().map(|l| &l.credit), currency)?)
    }

    /// True if this entry counts toward balances
    pub fn contributes_to_balances(&self) -> bool {
        self.status == EntryStatus::Posted
    }
}

#[derive(Debug)]
struct JournalState {
    entries: HashMap<JournalEntryId, JournalEntry>,
    next_entry_number: u64,
}

impl Default for JournalState {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_entry_number: 1,
        }
    }
}

/// The journal entry store
///
/// All methods take `&self`; the store can be shared across threads. The
/// chart of accounts is passed in explicitly wherever validation needs it.
#[derive(Debug)]
pub struct JournalStore {
    currency: Currency,
    state: RwLock<JournalState>,
}

impl JournalStore {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            state: RwLock::new(JournalState::default()),
        }
    }

    /// The ledger currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    fn read(&self) -> RwLockReadGuard<'_, JournalState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, JournalState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persists a candidate entry as a draft or posts it directly
    ///
    /// Validation: at least two lines, every line well-formed, every account
    /// postable; for [`PostingMode::Posted`] additionally debits == credits.
    /// Posting assigns the next entry number and inserts the entry in one
    /// atomic unit.
    pub fn create(
        &self,
        chart: &ChartOfAccounts,
        proposed: ProposedEntry,
        mode: PostingMode,
    ) -> Result<JournalEntry, LedgerError> {
        self.validate_lines(chart, &proposed.lines)?;
        if mode == PostingMode::Posted {
            self.ensure_balanced(&proposed.lines)?;
        }

        let now = Utc::now();
        let mut entry = JournalEntry {
            id: JournalEntryId::new_v7(),
            entry_number: None,
            date: proposed.date,
            description: proposed.description,
            status: EntryStatus::Draft,
            lines: proposed.lines,
            created_at: now,
            posted_at: None,
            voided_at: None,
            void_reason: None,
        };

        let mut state = self.write();
        if mode == PostingMode::Posted {
            entry.entry_number = Some(state.next_entry_number);
            state.next_entry_number += 1;
            entry.status = EntryStatus::Posted;
            entry.posted_at = Some(now);
        }
        state.entries.insert(entry.id, entry.clone());
        drop(state);

        tracing::info!(
            entry = %entry.id,
            number = ?entry.entry_number,
            status = %entry.status,
            lines = entry.lines.len(),
            "journal entry created"
        );
        Ok(entry)
    }

    /// Transitions a draft to POSTED
    ///
    /// Balance and postability are re-validated at transition time, since
    /// draft lines may have been edited after creation.
    pub fn post(
        &self,
        chart: &ChartOfAccounts,
        entry_id: JournalEntryId,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.write();
        let entry = state
            .entries
            .get(&entry_id)
            .ok_or_else(|| LedgerError::not_found(format!("journal entry {entry_id}")))?;

        if entry.status != EntryStatus::Draft {
            return Err(LedgerError::InvalidTransition {
                entry: entry_id,
                status: entry.status,
                action: "post",
            });
        }

        self.validate_lines(chart, &entry.lines)?;
        self.ensure_balanced(&entry.lines)?;

        let number = state.next_entry_number;
        state.next_entry_number += 1;
        let entry = state.entries.get_mut(&entry_id).expect("checked above");
        entry.entry_number = Some(number);
        entry.status = EntryStatus::Posted;
        entry.posted_at = Some(Utc::now());
        let posted = entry.clone();
        drop(state);

        tracing::info!(entry = %posted.id, number, "journal entry posted");
        Ok(posted)
    }

    /// Transitions a posted entry to VOIDED
    ///
    /// Lines are neither deleted nor mutated; the entry simply stops
    /// contributing to balances.
    pub fn void(
        &self,
        entry_id: JournalEntryId,
        reason: impl Into<String>,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.write();
        let entry = state
            .entries
            .get_mut(&entry_id)
            .ok_or_else(|| LedgerError::not_found(format!("journal entry {entry_id}")))?;

        if entry.status != EntryStatus::Posted {
            return Err(LedgerError::InvalidTransition {
                entry: entry_id,
                status: entry.status,
                action: "void",
            });
        }

        entry.status = EntryStatus::Voided;
        entry.voided_at = Some(Utc::now());
        entry.void_reason = Some(reason.into());
        let voided = entry.clone();
        drop(state);

        tracing::warn!(entry = %voided.id, number = ?voided.entry_number, "journal entry voided");
        Ok(voided)
    }

    /// Edits a draft entry
    ///
    /// Replaced lines are validated structurally and against the chart, but
    /// balance is only enforced at posting time.
    pub fn update_draft(
        &self,
        chart: &ChartOfAccounts,
        entry_id: JournalEntryId,
        patch: EntryPatch,
    ) -> Result<JournalEntry, LedgerError> {
        if let Some(lines) = &patch.lines {
            self.validate_lines(chart, lines)?;
        }

        let mut state = self.write();
        let entry = state
            .entries
            .get_mut(&entry_id)
            .ok_or_else(|| LedgerError::not_found(format!("journal entry {entry_id}")))?;

        match entry.status {
            EntryStatus::Draft => {}
            EntryStatus::Posted => return Err(LedgerError::ImmutableEntry(entry_id)),
            EntryStatus::Voided => {
                return Err(LedgerError::InvalidTransition {
                    entry: entry_id,
                    status: entry.status,
                    action: "update",
                })
            }
        }

        if let Some(date) = patch.date {
            entry.date = date;
        }
        if let Some(description) = patch.description {
            entry.description = description;
        }
        if let Some(lines) = patch.lines {
            entry.lines = lines;
        }

        Ok(entry.clone())
    }

    /// Deletes a draft entry; any other status is a state-machine violation
    pub fn delete_draft(&self, entry_id: JournalEntryId) -> Result<(), LedgerError> {
        let mut state = self.write();
        let entry = state
            .entries
            .get(&entry_id)
            .ok_or_else(|| LedgerError::not_found(format!("journal entry {entry_id}")))?;

        if entry.status != EntryStatus::Draft {
            return Err(LedgerError::InvalidTransition {
                entry: entry_id,
                status: entry.status,
                action: "delete",
            });
        }

        state.entries.remove(&entry_id);
        Ok(())
    }

    /// Fetches an entry by id
    pub fn get(&self, entry_id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.read()
            .entries
            .get(&entry_id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(format!("journal entry {entry_id}")))
    }

    /// Snapshot of POSTED entries, ordered by (date, entry number)
    ///
    /// This is the read-side feed: drafts and voided entries never appear.
    pub fn posted_entries(&self) -> Vec<JournalEntry> {
        let mut posted: Vec<_> = self
            .read()
            .entries
            .values()
            .filter(|e| e.status == EntryStatus::Posted)
            .cloned()
            .collect();
        posted.sort_by_key(|e| (e.date, e.entry_number));
        posted
    }

    /// Administrative snapshot of all entries regardless of status
    pub fn entries(&self) -> Vec<JournalEntry> {
        let mut all: Vec<_> = self.read().entries.values().cloned().collect();
        all.sort_by_key(|e| (e.date, e.entry_number, e.created_at));
        all
    }

    fn validate_lines(
        &self,
        chart: &ChartOfAccounts,
        lines: &[JournalEntryLine],
    ) -> Result<(), LedgerError> {
        if lines.len() < 2 {
            return Err(LedgerError::validation(format!(
                "a journal entry requires at least 2 lines, got {}",
                lines.len()
            )));
        }

        for line in lines {
            line.validate(self.currency)?;

            let account = chart.get(line.account_id).ok_or_else(|| {
                LedgerError::UnknownAccount {
                    code: line.account_id.to_string(),
                }
            })?;
            if !account.is_postable() {
                return Err(LedgerError::NonPostableAccount {
                    line_number: line.line_number,
                    code: account.code,
                });
            }
        }

        Ok(())
    }

    fn ensure_balanced(&self, lines: &[JournalEntryLine]) -> Result<(), LedgerError> {
        let debits = Money::sum(lines.iter().map(|l| &l.debit), self.currency)?;
        let credits = Money::sum(lines.iter().map(|l| &l.credit), self.currency)?;

        if debits != credits {
            return Err(LedgerError::unbalanced_entry(
                debits.amount(),
                credits.amount(),
            ));
        }
        Ok(())
    }
}

/// Signed balance contribution of a line for an account's normal side
///
/// Asset and expense accounts grow with debits; liability, equity, and
/// income accounts grow with credits.
pub fn signed_amount(line: &JournalEntryLine, debit_normal: bool) -> Decimal {
    if debit_normal {
        line.debit.amount() - line.credit.amount()
    } else {
        line.credit.amount() - line.debit.amount()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AccountSpec, AccountType};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const CURRENCY: Currency = Currency::USD;

    fn money(amount: Decimal) -> Money {
        Money::new(amount, CURRENCY)
    }

    fn chart() -> (ChartOfAccounts, AccountId, AccountId, AccountId) {
        let chart = ChartOfAccounts::new();
        chart
            .create_account(AccountSpec::group("1", "Assets", AccountType::Asset))
            .unwrap();
        chart
            .create_account(AccountSpec::group("4", "Income", AccountType::Income))
            .unwrap();
        let cash = chart
            .create_account(AccountSpec::detail("1.1", "Cash", AccountType::Asset).with_parent("1"))
            .unwrap();
        let receivables = chart
            .create_account(
                AccountSpec::detail("1.2", "Accounts Receivable", AccountType::Asset)
                    .with_parent("1"),
            )
            .unwrap();
        let sales = chart
            .create_account(AccountSpec::detail("4.1", "Sales", AccountType::Income).with_parent("4"))
            .unwrap();
        (chart, cash.id, receivables.id, sales.id)
    }

    fn balanced_entry(debit_account: AccountId, credit_account: AccountId) -> ProposedEntry {
        ProposedEntry::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "Cash sale",
        )
        .debit(debit_account, money(dec!(100)))
        .credit(credit_account, money(dec!(100)))
    }

    #[test]
    fn line_constructors_enforce_one_sided_amounts() {
        let line = JournalEntryLine::debit(1, AccountId::new(), money(dec!(50)));
        assert!(line.is_debit());
        assert!(line.credit.is_zero());
        assert_eq!(line.amount(), money(dec!(50)));
    }

    #[test]
    fn create_posted_assigns_sequential_numbers() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let first = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Posted)
            .unwrap();
        let second = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Posted)
            .unwrap();

        assert_eq!(first.entry_number, Some(1));
        assert_eq!(second.entry_number, Some(2));
        assert_eq!(first.status, EntryStatus::Posted);
    }

    #[test]
    fn drafts_hold_no_entry_number() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let draft = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Draft)
            .unwrap();
        assert_eq!(draft.entry_number, None);
        assert_eq!(draft.status, EntryStatus::Draft);
    }

    #[test]
    fn unbalanced_posted_create_is_rejected_with_difference() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let proposed = ProposedEntry::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "Unbalanced",
        )
        .debit(cash, money(dec!(100)))
        .credit(sales, money(dec!(90)));

        let err = store
            .create(&chart, proposed, PostingMode::Posted)
            .unwrap_err();
        match err {
            LedgerError::UnbalancedEntry {
                debits,
                credits,
                difference,
            } => {
                assert_eq!(debits, dec!(100));
                assert_eq!(credits, dec!(90));
                assert_eq!(difference, dec!(10));
            }
            other => panic!("expected UnbalancedEntry, got {other:?}"),
        }
        assert!(store.entries().is_empty());
    }

    #[test]
    fn unbalanced_draft_is_accepted_until_posting() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let proposed = ProposedEntry::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "Half-done draft",
        )
        .debit(cash, money(dec!(100)))
        .credit(sales, money(dec!(90)));

        let draft = store
            .create(&chart, proposed, PostingMode::Draft)
            .unwrap();
        let err = store.post(&chart, draft.id).unwrap_err();
        assert!(matches!(err, LedgerError::UnbalancedEntry { .. }));
    }

    #[test]
    fn non_postable_account_is_rejected_and_nothing_is_created() {
        let (chart, cash, _, _) = chart();
        let group = chart.resolve("4").unwrap();
        let store = JournalStore::new(CURRENCY);

        let proposed = ProposedEntry::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "Posting to a group account",
        )
        .debit(cash, money(dec!(100)))
        .credit(group.id, money(dec!(100)));

        let err = store
            .create(&chart, proposed, PostingMode::Posted)
            .unwrap_err();
        match err {
            LedgerError::NonPostableAccount { line_number, code } => {
                assert_eq!(line_number, 2);
                assert_eq!(code, "4");
            }
            other => panic!("expected NonPostableAccount, got {other:?}"),
        }
        assert!(store.entries().is_empty());
    }

    #[test]
    fn fewer_than_two_lines_is_rejected() {
        let (chart, cash, _, _) = chart();
        let store = JournalStore::new(CURRENCY);

        let proposed = ProposedEntry::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "One-legged",
        )
        .debit(cash, money(dec!(100)));

        let err = store
            .create(&chart, proposed, PostingMode::Posted)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn post_transitions_draft_and_assigns_number() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let draft = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Draft)
            .unwrap();
        let posted = store.post(&chart, draft.id).unwrap();

        assert_eq!(posted.status, EntryStatus::Posted);
        assert_eq!(posted.entry_number, Some(1));
        assert!(posted.posted_at.is_some());
    }

    #[test]
    fn post_rejects_non_draft() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let posted = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Posted)
            .unwrap();
        let err = store.post(&chart, posted.id).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidTransition {
                status: EntryStatus::Posted,
                action: "post",
                ..
            }
        ));
    }

    #[test]
    fn void_keeps_lines_and_number() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let posted = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Posted)
            .unwrap();
        let voided = store.void(posted.id, "duplicate capture").unwrap();

        assert_eq!(voided.status, EntryStatus::Voided);
        assert_eq!(voided.entry_number, posted.entry_number);
        assert_eq!(voided.lines, posted.lines);
        assert_eq!(voided.void_reason.as_deref(), Some("duplicate capture"));
        assert!(store.posted_entries().is_empty());
    }

    #[test]
    fn void_rejects_draft_and_is_terminal() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let draft = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Draft)
            .unwrap();
        assert!(matches!(
            store.void(draft.id, "nope").unwrap_err(),
            LedgerError::InvalidTransition { .. }
        ));

        let posted = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Posted)
            .unwrap();
        store.void(posted.id, "first").unwrap();
        assert!(matches!(
            store.void(posted.id, "second").unwrap_err(),
            LedgerError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn update_draft_replaces_lines_wholesale() {
        let (chart, cash, receivables, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let draft = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Draft)
            .unwrap();

        let new_lines = vec![
            JournalEntryLine::debit(1, receivables, money(dec!(250))),
            JournalEntryLine::credit(2, sales, money(dec!(250))),
        ];
        let updated = store
            .update_draft(
                &chart,
                draft.id,
                EntryPatch {
                    description: Some("Invoice on credit".to_string()),
                    lines: Some(new_lines),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.lines.len(), 2);
        assert_eq!(updated.lines[0].account_id, receivables);
        assert_eq!(updated.description, "Invoice on credit");
    }

    #[test]
    fn update_posted_is_immutable() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let posted = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Posted)
            .unwrap();
        let err = store
            .update_draft(
                &chart,
                posted.id,
                EntryPatch {
                    description: Some("tampering".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::ImmutableEntry(_)));
    }

    #[test]
    fn delete_draft_only() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let draft = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Draft)
            .unwrap();
        store.delete_draft(draft.id).unwrap();
        assert!(matches!(
            store.get(draft.id).unwrap_err(),
            LedgerError::NotFound(_)
        ));

        let posted = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Posted)
            .unwrap();
        assert!(matches!(
            store.delete_draft(posted.id).unwrap_err(),
            LedgerError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn deleted_drafts_leave_no_numbering_gap() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let draft = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Draft)
            .unwrap();
        store.delete_draft(draft.id).unwrap();

        let posted = store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Posted)
            .unwrap();
        assert_eq!(posted.entry_number, Some(1));
    }

    #[test]
    fn concurrent_posting_yields_consecutive_distinct_numbers() {
        let (chart, cash, _, sales) = chart();
        let chart = Arc::new(chart);
        let store = Arc::new(JournalStore::new(CURRENCY));

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let chart = Arc::clone(&chart);
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .create(&chart, balanced_entry(cash, sales), PostingMode::Posted)
                        .unwrap()
                        .entry_number
                        .unwrap()
                })
            })
            .collect();

        let mut numbers: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=100).collect::<Vec<u64>>());
    }

    #[test]
    fn posted_entries_are_ordered_and_exclude_drafts() {
        let (chart, cash, _, sales) = chart();
        let store = JournalStore::new(CURRENCY);

        let later = ProposedEntry::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            "May entry",
        )
        .debit(cash, money(dec!(10)))
        .credit(sales, money(dec!(10)));
        let earlier = ProposedEntry::new(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            "April entry",
        )
        .debit(cash, money(dec!(20)))
        .credit(sales, money(dec!(20)));

        store.create(&chart, later, PostingMode::Posted).unwrap();
        store.create(&chart, earlier, PostingMode::Posted).unwrap();
        store
            .create(&chart, balanced_entry(cash, sales), PostingMode::Draft)
            .unwrap();

        let posted = store.posted_entries();
        assert_eq!(posted.len(), 2);
        assert_eq!(posted[0].description, "April entry");
        assert_eq!(posted[1].description, "May entry");
    }
}
