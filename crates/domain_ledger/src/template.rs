//! Template-driven entry generation
//!
//! Templates map named business events (triggers) to parametrized sets of
//! journal lines. At generation time each template line resolves its account
//! code against the chart and its amount type against a caller-supplied
//! context of document amounts, producing a balanced [`ProposedEntry`].
//!
//! Template account codes are resolved at use-time, not at authoring-time,
//! so the chart can evolve after templates are seeded.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use core_kernel::{Currency, Money, Rate, TemplateId};

use crate::chart::ChartOfAccounts;
use crate::error::LedgerError;
use crate::journal::{JournalEntryLine, ProposedEntry};

/// Business events that trigger entry generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    SaleInvoice,
    PurchaseInvoice,
    CustomerPayment,
    SupplierPayment,
    SalaryPayment,
    LoanDisbursement,
    LoanPayment,
    Expense,
    Adjustment,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriggerType::SaleInvoice => "SALE_INVOICE",
            TriggerType::PurchaseInvoice => "PURCHASE_INVOICE",
            TriggerType::CustomerPayment => "CUSTOMER_PAYMENT",
            TriggerType::SupplierPayment => "SUPPLIER_PAYMENT",
            TriggerType::SalaryPayment => "SALARY_PAYMENT",
            TriggerType::LoanDisbursement => "LOAN_DISBURSEMENT",
            TriggerType::LoanPayment => "LOAN_PAYMENT",
            TriggerType::Expense => "EXPENSE",
            TriggerType::Adjustment => "ADJUSTMENT",
        };
        write!(f, "{s}")
    }
}

/// How a template line resolves its amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmountType {
    Total,
    Subtotal,
    Tax,
    Retention,
    NetPayment,
    Principal,
    Interest,
    /// `percentage_base * (percentage / 100)`, banker's rounding
    Percentage,
    /// A literal amount carried by the template line
    Fixed,
}

impl AmountType {
    /// The context field this amount type reads, if any
    pub fn context_field(&self) -> Option<&'static str> {
        match self {
            AmountType::Total => Some("total"),
            AmountType::Subtotal => Some("subtotal"),
            AmountType::Tax => Some("tax"),
            AmountType::Retention => Some("retention"),
            AmountType::NetPayment => Some("net_payment"),
            AmountType::Principal => Some("principal"),
            AmountType::Interest => Some("interest"),
            AmountType::Percentage | AmountType::Fixed => None,
        }
    }
}

/// Which side of the entry a template line produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Debit,
    Credit,
}

/// One line of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLine {
    /// Order within the template (1-based, contiguous)
    pub line_number: u32,
    /// Account code, resolved against the chart at generation time
    pub account_code: String,
    /// Debit or credit
    pub side: Side,
    /// How the amount is resolved
    pub amount_type: AmountType,
    /// Literal amount for [`AmountType::Fixed`]
    pub fixed_amount: Option<Money>,
    /// Percentage for [`AmountType::Percentage`] (e.g. 21 for 21%)
    pub percentage: Option<Decimal>,
    /// Optional line description
    pub description: Option<String>,
}

impl TemplateLine {
    /// Creates a debit line
    pub fn debit(line_number: u32, account_code: impl Into<String>, amount_type: AmountType) -> Self {
        Self {
            line_number,
            account_code: account_code.into(),
            side: Side::Debit,
            amount_type,
            fixed_amount: None,
            percentage: None,
            description: None,
        }
    }

    /// Creates a credit line
    pub fn credit(line_number: u32, account_code: impl Into<String>, amount_type: AmountType) -> Self {
        Self {
            line_number,
            account_code: account_code.into(),
            side: Side::Credit,
            amount_type,
            fixed_amount: None,
            percentage: None,
            description: None,
        }
    }

    /// Sets the literal amount (for Fixed lines)
    pub fn with_fixed_amount(mut self, amount: Money) -> Self {
        self.fixed_amount = Some(amount);
        self
    }

    /// Sets the percentage (for Percentage lines)
    pub fn with_percentage(mut self, percentage: Decimal) -> Self {
        self.percentage = Some(percentage);
        self
    }

    /// Sets the line description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A journal entry template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryTemplate {
    /// Stable identifier, preserved across upserts
    pub id: TemplateId,
    /// Unique code; the stable key other code depends on
    pub code: String,
    /// Human-readable name, used as the generated entry's description
    pub name: String,
    /// The business event this template serves
    pub trigger: TriggerType,
    /// Inactive templates cannot generate entries
    pub is_active: bool,
    /// Ordered lines
    pub lines: Vec<TemplateLine>,
    /// Last authoring change
    pub updated_at: DateTime<Utc>,
}

/// Authoring input; upsert by code replaces lines wholesale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub code: String,
    pub name: String,
    pub trigger: TriggerType,
    pub is_active: bool,
    pub lines: Vec<TemplateLine>,
}

impl TemplateSpec {
    pub fn new(code: impl Into<String>, name: impl Into<String>, trigger: TriggerType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            trigger,
            is_active: true,
            lines: Vec::new(),
        }
    }

    /// Appends a line
    pub fn line(mut self, line: TemplateLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Marks the template inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// The amounts of the originating business document
///
/// A named bag of decimal amounts; templates read from it by
/// [`AmountType`]. Fields a template does not use may be left unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerContext {
    currency: Currency,
    total: Option<Money>,
    subtotal: Option<Money>,
    tax: Option<Money>,
    retention: Option<Money>,
    net_payment: Option<Money>,
    principal: Option<Money>,
    interest: Option<Money>,
    percentage_base: Option<Money>,
}

impl TriggerContext {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            total: None,
            subtotal: None,
            tax: None,
            retention: None,
            net_payment: None,
            principal: None,
            interest: None,
            percentage_base: None,
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn with_total(mut self, amount: Decimal) -> Self {
        self.total = Some(Money::new(amount, self.currency));
        self
    }

    pub fn with_subtotal(mut self, amount: Decimal) -> Self {
        self.subtotal = Some(Money::new(amount, self.currency));
        self
    }

    pub fn with_tax(mut self, amount: Decimal) -> Self {
        self.tax = Some(Money::new(amount, self.currency));
        self
    }

    pub fn with_retention(mut self, amount: Decimal) -> Self {
        self.retention = Some(Money::new(amount, self.currency));
        self
    }

    pub fn with_net_payment(mut self, amount: Decimal) -> Self {
        self.net_payment = Some(Money::new(amount, self.currency));
        self
    }

    pub fn with_principal(mut self, amount: Decimal) -> Self {
        self.principal = Some(Money::new(amount, self.currency));
        self
    }

    pub fn with_interest(mut self, amount: Decimal) -> Self {
        self.interest = Some(Money::new(amount, self.currency));
        self
    }

    pub fn with_percentage_base(mut self, amount: Decimal) -> Self {
        self.percentage_base = Some(Money::new(amount, self.currency));
        self
    }

    /// Reads the context field backing an amount type
    pub fn field(&self, amount_type: AmountType) -> Option<Money> {
        match amount_type {
            AmountType::Total => self.total,
            AmountType::Subtotal => self.subtotal,
            AmountType::Tax => self.tax,
            AmountType::Retention => self.retention,
            AmountType::NetPayment => self.net_payment,
            AmountType::Principal => self.principal,
            AmountType::Interest => self.interest,
            AmountType::Percentage | AmountType::Fixed => None,
        }
    }

    pub fn percentage_base(&self) -> Option<Money> {
        self.percentage_base
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    by_code: BTreeMap<String, EntryTemplate>,
}

/// The template registry
///
/// Authoring is upsert-by-code with wholesale line replacement, so a
/// template is never observable in a half-updated state. Re-running the same
/// upsert is idempotent.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    state: RwLock<RegistryState>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates or replaces a template
    ///
    /// Structural validation only: balance depends on resolved amounts and
    /// is checked at generation time. Account codes are not resolved here
    /// (seed tooling may load templates before the chart).
    pub fn upsert(&self, spec: TemplateSpec) -> Result<EntryTemplate, LedgerError> {
        validate_spec(&spec)?;

        let mut lines = spec.lines;
        lines.sort_by_key(|l| l.line_number);

        let mut state = self.write();
        let id = state
            .by_code
            .get(&spec.code)
            .map(|existing| existing.id)
            .unwrap_or_else(TemplateId::new_v7);

        let template = EntryTemplate {
            id,
            code: spec.code.clone(),
            name: spec.name,
            trigger: spec.trigger,
            is_active: spec.is_active,
            lines,
            updated_at: Utc::now(),
        };
        state.by_code.insert(spec.code, template.clone());
        drop(state);

        tracing::debug!(code = %template.code, trigger = %template.trigger, "template upserted");
        Ok(template)
    }

    /// Resolves a template by code regardless of active flag
    pub fn resolve(&self, code: &str) -> Result<EntryTemplate, LedgerError> {
        self.read()
            .by_code
            .get(code)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(format!("template {code}")))
    }

    /// All active templates for a trigger
    pub fn find_active_by_trigger(&self, trigger: TriggerType) -> Vec<EntryTemplate> {
        self.read()
            .by_code
            .values()
            .filter(|t| t.is_active && t.trigger == trigger)
            .cloned()
            .collect()
    }

    /// Deactivates a template; it remains resolvable but cannot generate
    pub fn deactivate(&self, code: &str) -> Result<EntryTemplate, LedgerError> {
        let mut state = self.write();
        let template = state
            .by_code
            .get_mut(code)
            .ok_or_else(|| LedgerError::not_found(format!("template {code}")))?;
        template.is_active = false;
        template.updated_at = Utc::now();
        Ok(template.clone())
    }

    /// Snapshot of all templates, ordered by code
    pub fn templates(&self) -> Vec<EntryTemplate> {
        self.read().by_code.values().cloned().collect()
    }
}

fn validate_spec(spec: &TemplateSpec) -> Result<(), LedgerError> {
    if spec.code.is_empty() {
        return Err(LedgerError::validation("template code must not be empty"));
    }
    if spec.lines.is_empty() {
        return Err(LedgerError::validation(format!(
            "template {} has no lines",
            spec.code
        )));
    }

    let mut numbers: Vec<u32> = spec.lines.iter().map(|l| l.line_number).collect();
    numbers.sort_unstable();
    let contiguous = numbers
        .iter()
        .enumerate()
        .all(|(i, n)| *n == i as u32 + 1);
    if !contiguous {
        return Err(LedgerError::validation(format!(
            "template {} line numbers must be unique and contiguous from 1",
            spec.code
        )));
    }

    let debit = spec.lines.iter().find(|l| l.side == Side::Debit);
    let credit = spec.lines.iter().find(|l| l.side == Side::Credit);
    match (debit, credit) {
        (Some(_), Some(_)) => {}
        _ => {
            return Err(LedgerError::validation(format!(
                "template {} needs at least one debit and one credit line",
                spec.code
            )))
        }
    }
    let distinct = spec.lines.iter().filter(|l| l.side == Side::Debit).any(|d| {
        spec.lines
            .iter()
            .filter(|l| l.side == Side::Credit)
            .any(|c| c.account_code != d.account_code)
    });
    if !distinct {
        return Err(LedgerError::validation(format!(
            "template {} must debit and credit distinct accounts",
            spec.code
        )));
    }

    for line in &spec.lines {
        match line.amount_type {
            AmountType::Fixed => {
                let amount = line.fixed_amount.ok_or_else(|| {
                    LedgerError::validation(format!(
                        "template {} line {} is FIXED but carries no fixed amount",
                        spec.code, line.line_number
                    ))
                })?;
                if amount.is_negative() {
                    return Err(LedgerError::validation(format!(
                        "template {} line {} has a negative fixed amount",
                        spec.code, line.line_number
                    )));
                }
            }
            AmountType::Percentage => {
                let pct = line.percentage.ok_or_else(|| {
                    LedgerError::validation(format!(
                        "template {} line {} is PERCENTAGE but carries no percentage",
                        spec.code, line.line_number
                    ))
                })?;
                if pct.is_sign_negative() {
                    return Err(LedgerError::validation(format!(
                        "template {} line {} has a negative percentage",
                        spec.code, line.line_number
                    )));
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Resolves templates into balanced entry candidates
///
/// Borrows the chart and registry explicitly; holds no state of its own.
pub struct TemplateEngine<'a> {
    chart: &'a ChartOfAccounts,
    registry: &'a TemplateRegistry,
    currency: Currency,
}

impl<'a> TemplateEngine<'a> {
    pub fn new(chart: &'a ChartOfAccounts, registry: &'a TemplateRegistry, currency: Currency) -> Self {
        Self {
            chart,
            registry,
            currency,
        }
    }

    /// Generates a balanced entry candidate from a template and context
    ///
    /// Lines resolving to exactly zero are dropped; the remainder must still
    /// balance, otherwise the template configuration is defective and
    /// [`LedgerError::UnbalancedTemplate`] is returned. The candidate is not
    /// persisted; the caller chooses draft or direct posting.
    pub fn generate(
        &self,
        template_code: &str,
        date: NaiveDate,
        context: &TriggerContext,
    ) -> Result<ProposedEntry, LedgerError> {
        let template = self.registry.resolve(template_code)?;
        if !template.is_active {
            return Err(LedgerError::not_found(format!(
                "template {template_code} is inactive"
            )));
        }
        if context.currency() != self.currency {
            return Err(LedgerError::validation(format!(
                "context carries currency {} but the ledger uses {}",
                context.currency(),
                self.currency
            )));
        }

        let mut entry = ProposedEntry::new(date, template.name.clone());
        let mut line_number = 0u32;

        for line in &template.lines {
            let account = self
                .chart
                .resolve(&line.account_code)
                .map_err(|_| LedgerError::UnknownAccount {
                    code: line.account_code.clone(),
                })?;
            if !account.is_postable() {
                return Err(LedgerError::NonPostableAccount {
                    line_number: line.line_number,
                    code: account.code,
                });
            }

            let amount = self.resolve_amount(&template, line, context)?;
            if amount.is_negative() {
                return Err(LedgerError::validation(format!(
                    "template {} line {} resolved to a negative amount {}",
                    template.code, line.line_number, amount
                )));
            }
            if amount.is_zero() {
                // Zero lines are dropped; balance is re-checked below.
                continue;
            }

            line_number += 1;
            let mut resolved = match line.side {
                Side::Debit => JournalEntryLine::debit(line_number, account.id, amount),
                Side::Credit => JournalEntryLine::credit(line_number, account.id, amount),
            };
            resolved.description = line.description.clone();
            entry.lines.push(resolved);
        }

        let debits = Money::sum(entry.lines.iter().map(|l| &l.debit), self.currency)?;
        let credits = Money::sum(entry.lines.iter().map(|l| &l.credit), self.currency)?;
        if debits != credits {
            return Err(LedgerError::unbalanced_template(
                template.code.clone(),
                debits.amount(),
                credits.amount(),
            ));
        }

        tracing::debug!(
            template = %template.code,
            lines = entry.lines.len(),
            debits = %debits,
            "entry generated from template"
        );
        Ok(entry)
    }

    fn resolve_amount(
        &self,
        template: &EntryTemplate,
        line: &TemplateLine,
        context: &TriggerContext,
    ) -> Result<Money, LedgerError> {
        match line.amount_type {
            AmountType::Percentage => {
                let pct = line.percentage.ok_or_else(|| {
                    LedgerError::validation(format!(
                        "template {} line {} carries no percentage",
                        template.code, line.line_number
                    ))
                })?;
                let base = context.percentage_base().ok_or_else(|| {
                    LedgerError::MissingContextField {
                        template: template.code.clone(),
                        field: "percentage_base",
                    }
                })?;
                // Money::new rounds half-to-even at the currency's minimum unit.
                Ok(Rate::from_percentage(pct).apply(&base))
            }
            AmountType::Fixed => {
                let amount = line.fixed_amount.ok_or_else(|| {
                    LedgerError::validation(format!(
                        "template {} line {} carries no fixed amount",
                        template.code, line.line_number
                    ))
                })?;
                if amount.currency() != self.currency {
                    return Err(LedgerError::validation(format!(
                        "template {} line {} fixed amount carries currency {}",
                        template.code,
                        line.line_number,
                        amount.currency()
                    )));
                }
                Ok(amount)
            }
            field_kind => {
                let field = field_kind
                    .context_field()
                    .expect("non-computed amount types map to a context field");
                context
                    .field(field_kind)
                    .ok_or_else(|| LedgerError::MissingContextField {
                        template: template.code.clone(),
                        field,
                    })
            }
        }
    }
}
