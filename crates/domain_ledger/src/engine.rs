//! General ledger facade
//!
//! Owns the chart of accounts, the journal entry store, and the template
//! registry, and coordinates the validations that span them. The document
//! workflow drives the engine through [`GeneralLedger::generate_and_post`]:
//! it supplies a trigger and a context and never constructs journal lines
//! itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, JournalEntryId};

use crate::chart::{Account, AccountPatch, AccountSpec, ChartOfAccounts};
use crate::error::LedgerError;
use crate::journal::{EntryPatch, JournalEntry, JournalStore, PostingMode, ProposedEntry};
use crate::template::{
    EntryTemplate, TemplateEngine, TemplateRegistry, TemplateSpec, TriggerContext, TriggerType,
};

/// What happened to an account on removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountRemoval {
    /// No posted history; the account was physically removed
    Removed,
    /// Posted lines exist; the account was soft-disabled instead
    Disabled,
}

/// The general ledger engine
///
/// A synchronous facade over shared, thread-safe stores. All methods take
/// `&self`, so one instance can serve concurrent callers.
#[derive(Debug)]
pub struct GeneralLedger {
    currency: Currency,
    chart: ChartOfAccounts,
    journal: JournalStore,
    templates: TemplateRegistry,
}

impl GeneralLedger {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            chart: ChartOfAccounts::new(),
            journal: JournalStore::new(currency),
            templates: TemplateRegistry::new(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The chart of accounts
    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    /// The journal entry store
    pub fn journal(&self) -> &JournalStore {
        &self.journal
    }

    /// The template registry
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    // ---- administrative operations -------------------------------------

    /// Creates an account (idempotence is the seeding tool's concern;
    /// re-creating an existing code fails validation)
    pub fn create_account(&self, spec: AccountSpec) -> Result<Account, LedgerError> {
        self.chart.create_account(spec)
    }

    /// Applies an administrative patch to an account
    pub fn update_account(&self, code: &str, patch: AccountPatch) -> Result<Account, LedgerError> {
        self.chart.update_account(code, patch)
    }

    /// Removes an account, or soft-disables it when posted lines exist
    ///
    /// Accounts with posted (including voided) lines are never physically
    /// deleted; their history must stay resolvable.
    pub fn remove_account(&self, code: &str) -> Result<AccountRemoval, LedgerError> {
        let account = self.chart.resolve(code)?;

        let has_history = self
            .journal
            .entries()
            .iter()
            .filter(|e| e.entry_number.is_some())
            .any(|e| e.lines.iter().any(|l| l.account_id == account.id));

        if has_history {
            self.chart.disable(code)?;
            return Ok(AccountRemoval::Disabled);
        }

        self.chart.remove(code)?;
        Ok(AccountRemoval::Removed)
    }

    /// Creates or replaces a template (upsert by code)
    pub fn upsert_template(&self, spec: TemplateSpec) -> Result<EntryTemplate, LedgerError> {
        self.templates.upsert(spec)
    }

    /// Deactivates a template
    pub fn deactivate_template(&self, code: &str) -> Result<EntryTemplate, LedgerError> {
        self.templates.deactivate(code)
    }

    // ---- entry generation ----------------------------------------------

    /// Generates a candidate entry from a template without persisting it
    pub fn generate(
        &self,
        template_code: &str,
        date: NaiveDate,
        context: &TriggerContext,
    ) -> Result<ProposedEntry, LedgerError> {
        TemplateEngine::new(&self.chart, &self.templates, self.currency)
            .generate(template_code, date, context)
    }

    /// Resolves the active template for a trigger, generates, and persists
    ///
    /// Exactly one active template must exist for the trigger; several active
    /// templates are a configuration error, not a silent pick.
    pub fn generate_and_post(
        &self,
        trigger: TriggerType,
        date: NaiveDate,
        context: &TriggerContext,
        mode: PostingMode,
    ) -> Result<JournalEntry, LedgerError> {
        let mut candidates = self.templates.find_active_by_trigger(trigger);
        let template = match candidates.len() {
            0 => {
                return Err(LedgerError::not_found(format!(
                    "no active template for trigger {trigger}"
                )))
            }
            1 => candidates.remove(0),
            n => {
                return Err(LedgerError::validation(format!(
                    "trigger {trigger} has {n} active templates; address one by code"
                )))
            }
        };

        self.generate_and_post_template(&template.code, date, context, mode)
    }

    /// Generates from a specific template and persists in the given mode
    pub fn generate_and_post_template(
        &self,
        template_code: &str,
        date: NaiveDate,
        context: &TriggerContext,
        mode: PostingMode,
    ) -> Result<JournalEntry, LedgerError> {
        let proposed = self.generate(template_code, date, context)?;
        self.journal.create(&self.chart, proposed, mode)
    }

    /// Persists a caller-built candidate entry
    pub fn create_entry(
        &self,
        proposed: ProposedEntry,
        mode: PostingMode,
    ) -> Result<JournalEntry, LedgerError> {
        self.journal.create(&self.chart, proposed, mode)
    }

    // ---- lifecycle transitions -----------------------------------------

    /// Posts a draft entry
    pub fn post(&self, entry_id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.journal.post(&self.chart, entry_id)
    }

    /// Voids a posted entry
    pub fn void(
        &self,
        entry_id: JournalEntryId,
        reason: impl Into<String>,
    ) -> Result<JournalEntry, LedgerError> {
        self.journal.void(entry_id, reason)
    }

    /// Edits a draft entry
    pub fn update_draft(
        &self,
        entry_id: JournalEntryId,
        patch: EntryPatch,
    ) -> Result<JournalEntry, LedgerError> {
        self.journal.update_draft(&self.chart, entry_id, patch)
    }

    /// Deletes a draft entry
    pub fn delete_draft(&self, entry_id: JournalEntryId) -> Result<(), LedgerError> {
        self.journal.delete_draft(entry_id)
    }

    /// Fetches an entry by id
    pub fn entry(&self, entry_id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.journal.get(entry_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::AccountType;
    use crate::template::{AmountType, Side, TemplateLine};
    use rust_decimal_macros::dec;

    const CURRENCY: Currency = Currency::USD;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn seeded_ledger() -> GeneralLedger {
        let ledger = GeneralLedger::new(CURRENCY);
        ledger
            .create_account(AccountSpec::group("1", "Assets", AccountType::Asset))
            .unwrap();
        ledger
            .create_account(AccountSpec::group("2", "Liabilities", AccountType::Liability))
            .unwrap();
        ledger
            .create_account(AccountSpec::group("4", "Income", AccountType::Income))
            .unwrap();
        ledger
            .create_account(
                AccountSpec::detail("1.2", "Accounts Receivable", AccountType::Asset)
                    .with_parent("1"),
            )
            .unwrap();
        ledger
            .create_account(
                AccountSpec::detail("2.1", "VAT Payable", AccountType::Liability).with_parent("2"),
            )
            .unwrap();
        ledger
            .create_account(
                AccountSpec::detail("4.1", "Sales", AccountType::Income).with_parent("4"),
            )
            .unwrap();
        ledger
            .upsert_template(
                TemplateSpec::new("SALE_INVOICE_A", "Sale invoice", TriggerType::SaleInvoice)
                    .line(TemplateLine::debit(1, "1.2", AmountType::Total))
                    .line(TemplateLine::credit(2, "4.1", AmountType::Subtotal))
                    .line(TemplateLine::credit(3, "2.1", AmountType::Tax)),
            )
            .unwrap();
        ledger
    }

    fn sale_context() -> TriggerContext {
        TriggerContext::new(CURRENCY)
            .with_subtotal(dec!(1000))
            .with_tax(dec!(210))
            .with_total(dec!(1210))
    }

    #[test]
    fn generate_and_post_by_trigger_posts_a_balanced_entry() {
        let ledger = seeded_ledger();

        let entry = ledger
            .generate_and_post(
                TriggerType::SaleInvoice,
                date(),
                &sale_context(),
                PostingMode::Posted,
            )
            .unwrap();

        assert_eq!(entry.entry_number, Some(1));
        assert_eq!(entry.lines.len(), 3);
        assert_eq!(
            entry.debit_total(CURRENCY).unwrap(),
            entry.credit_total(CURRENCY).unwrap()
        );
    }

    #[test]
    fn generate_and_post_fails_without_active_template() {
        let ledger = seeded_ledger();
        let err = ledger
            .generate_and_post(
                TriggerType::LoanPayment,
                date(),
                &sale_context(),
                PostingMode::Posted,
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn generate_and_post_rejects_ambiguous_trigger() {
        let ledger = seeded_ledger();
        ledger
            .upsert_template(
                TemplateSpec::new("SALE_INVOICE_B", "Alternate sale", TriggerType::SaleInvoice)
                    .line(TemplateLine::debit(1, "1.2", AmountType::Total))
                    .line(TemplateLine::credit(2, "4.1", AmountType::Total)),
            )
            .unwrap();

        let err = ledger
            .generate_and_post(
                TriggerType::SaleInvoice,
                date(),
                &sale_context(),
                PostingMode::Posted,
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        // Addressing a template by code still works.
        ledger
            .generate_and_post_template("SALE_INVOICE_A", date(), &sale_context(), PostingMode::Posted)
            .unwrap();
    }

    #[test]
    fn draft_mode_defers_numbering_until_post() {
        let ledger = seeded_ledger();

        let draft = ledger
            .generate_and_post(
                TriggerType::SaleInvoice,
                date(),
                &sale_context(),
                PostingMode::Draft,
            )
            .unwrap();
        assert_eq!(draft.entry_number, None);

        let posted = ledger.post(draft.id).unwrap();
        assert_eq!(posted.entry_number, Some(1));
    }

    #[test]
    fn remove_account_without_history_is_physical() {
        let ledger = seeded_ledger();
        ledger
            .create_account(
                AccountSpec::detail("1.9", "Unused", AccountType::Asset).with_parent("1"),
            )
            .unwrap();

        assert_eq!(
            ledger.remove_account("1.9").unwrap(),
            AccountRemoval::Removed
        );
        assert!(ledger.chart().resolve("1.9").is_err());
    }

    #[test]
    fn remove_account_with_posted_history_soft_disables() {
        let ledger = seeded_ledger();
        ledger
            .generate_and_post(
                TriggerType::SaleInvoice,
                date(),
                &sale_context(),
                PostingMode::Posted,
            )
            .unwrap();

        assert_eq!(
            ledger.remove_account("4.1").unwrap(),
            AccountRemoval::Disabled
        );
        let sales = ledger.chart().resolve("4.1").unwrap();
        assert!(!sales.is_active);
    }

    #[test]
    fn removed_accounts_stay_resolvable_after_void() {
        let ledger = seeded_ledger();
        let entry = ledger
            .generate_and_post(
                TriggerType::SaleInvoice,
                date(),
                &sale_context(),
                PostingMode::Posted,
            )
            .unwrap();
        ledger.void(entry.id, "cancelled").unwrap();

        // Voided history still pins the account.
        assert_eq!(
            ledger.remove_account("4.1").unwrap(),
            AccountRemoval::Disabled
        );
    }

    #[test]
    fn template_side_enum_serializes_in_wire_case() {
        let json = serde_json::to_string(&Side::Debit).unwrap();
        assert_eq!(json, "\"DEBIT\"");
        let json = serde_json::to_string(&TriggerType::SaleInvoice).unwrap();
        assert_eq!(json, "\"SALE_INVOICE\"");
    }
}
