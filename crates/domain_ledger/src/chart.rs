//! Chart of accounts
//!
//! The chart is a tree of accounts keyed by dotted hierarchical codes
//! (e.g. `1.1.03`). Non-detail accounts are aggregation-only; journal lines
//! may only reference detail accounts that accept entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use core_kernel::AccountId;

use crate::error::LedgerError;

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Income accounts (credit normal balance)
    Income,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

/// Returns the hierarchy level of a dotted account code
///
/// The level is the dot-segment count: `1` is level 1, `1.1.03` is level 3.
/// Derived, never stored.
pub fn level_of(code: &str) -> usize {
    code.split('.').count()
}

/// An account in the chart of accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Dotted hierarchical code (e.g. "1.1.03")
    pub code: String,
    /// Account name
    pub name: String,
    /// Account type
    pub account_type: AccountType,
    /// Parent account code (for hierarchical charts)
    pub parent_code: Option<String>,
    /// True only for leaf accounts eligible for posting
    pub is_detail_account: bool,
    /// True if lines may post directly to this account
    pub accepts_entries: bool,
    /// Whether the account is active (soft-disable instead of delete)
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Hierarchy level derived from the code's dot-segment count
    pub fn level(&self) -> usize {
        level_of(&self.code)
    }

    /// True if journal lines may post directly to this account
    pub fn is_postable(&self) -> bool {
        self.is_detail_account && self.accepts_entries && self.is_active
    }
}

/// Input value for creating an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSpec {
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub parent_code: Option<String>,
    pub is_detail_account: bool,
    pub accepts_entries: bool,
}

impl AccountSpec {
    /// Creates a spec for a group (aggregation-only) account
    pub fn group(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
            parent_code: None,
            is_detail_account: false,
            accepts_entries: false,
        }
    }

    /// Creates a spec for a detail (posting-eligible) account
    pub fn detail(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
            parent_code: None,
            is_detail_account: true,
            accepts_entries: true,
        }
    }

    /// Sets the parent account code
    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    /// Overrides the accepts-entries flag (administrative override)
    pub fn with_accepts_entries(mut self, accepts: bool) -> Self {
        self.accepts_entries = accepts;
        self
    }
}

/// Patch for administrative account updates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub parent_code: Option<Option<String>>,
    pub is_detail_account: Option<bool>,
    pub accepts_entries: Option<bool>,
    pub is_active: Option<bool>,
}

impl AccountPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_accepts_entries(mut self, accepts: bool) -> Self {
        self.accepts_entries = Some(accepts);
        self
    }

    pub fn with_detail(mut self, detail: bool) -> Self {
        self.is_detail_account = Some(detail);
        self
    }

    pub fn with_parent(mut self, parent_code: Option<String>) -> Self {
        self.parent_code = Some(parent_code);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }
}

#[derive(Debug, Default)]
struct ChartState {
    by_code: BTreeMap<String, Account>,
    code_by_id: HashMap<AccountId, String>,
}

impl ChartState {
    fn has_children(&self, code: &str) -> bool {
        self.by_code
            .values()
            .any(|a| a.parent_code.as_deref() == Some(code))
    }
}

/// The chart of accounts registry
///
/// All methods take `&self`; the registry can be shared across threads.
/// There is no lifecycle state machine here, only tree invariants.
#[derive(Debug, Default)]
pub struct ChartOfAccounts {
    state: RwLock<ChartState>,
}

impl ChartOfAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ChartState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ChartState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// `Validation` if the code is malformed or already taken, if the parent
    /// is missing or is itself a detail account, or if the parent's type
    /// differs from the child's.
    pub fn create_account(&self, spec: AccountSpec) -> Result<Account, LedgerError> {
        validate_code(&spec.code)?;

        let mut state = self.write();

        if state.by_code.contains_key(&spec.code) {
            return Err(LedgerError::validation(format!(
                "account code {} already exists",
                spec.code
            )));
        }

        if let Some(parent_code) = &spec.parent_code {
            let parent = state.by_code.get(parent_code).ok_or_else(|| {
                LedgerError::validation(format!("parent account {parent_code} does not exist"))
            })?;
            if parent.is_detail_account {
                return Err(LedgerError::validation(format!(
                    "parent account {parent_code} is a detail account and cannot have children"
                )));
            }
            if parent.account_type != spec.account_type {
                return Err(LedgerError::validation(format!(
                    "account {} has type {:?} but parent {} has type {:?}",
                    spec.code, spec.account_type, parent_code, parent.account_type
                )));
            }
        }

        let account = Account {
            id: AccountId::new_v7(),
            code: spec.code,
            name: spec.name,
            account_type: spec.account_type,
            parent_code: spec.parent_code,
            is_detail_account: spec.is_detail_account,
            accepts_entries: spec.accepts_entries,
            is_active: true,
            created_at: Utc::now(),
        };

        state.code_by_id.insert(account.id, account.code.clone());
        state.by_code.insert(account.code.clone(), account.clone());

        Ok(account)
    }

    /// Applies an administrative patch to an account
    ///
    /// Re-validates tree invariants: an account with children cannot become a
    /// detail account, and a parent change must not introduce a cycle.
    pub fn update_account(&self, code: &str, patch: AccountPatch) -> Result<Account, LedgerError> {
        let mut state = self.write();

        if !state.by_code.contains_key(code) {
            return Err(LedgerError::not_found(format!("account {code}")));
        }

        if patch.is_detail_account == Some(true) && state.has_children(code) {
            return Err(LedgerError::validation(format!(
                "account {code} has children and cannot become a detail account"
            )));
        }

        if let Some(new_parent) = &patch.parent_code {
            if let Some(parent_code) = new_parent {
                let account_type = state.by_code[code].account_type;
                let parent = state.by_code.get(parent_code).ok_or_else(|| {
                    LedgerError::validation(format!("parent account {parent_code} does not exist"))
                })?;
                if parent.is_detail_account {
                    return Err(LedgerError::validation(format!(
                        "parent account {parent_code} is a detail account and cannot have children"
                    )));
                }
                if parent.account_type != account_type {
                    return Err(LedgerError::validation(format!(
                        "parent account {parent_code} has a different account type"
                    )));
                }
                if creates_cycle(&state, code, parent_code) {
                    return Err(LedgerError::validation(format!(
                        "setting parent {parent_code} on {code} would create a cycle"
                    )));
                }
            }
        }

        let account = state.by_code.get_mut(code).expect("checked above");
        if let Some(name) = patch.name {
            account.name = name;
        }
        if let Some(parent_code) = patch.parent_code {
            account.parent_code = parent_code;
        }
        if let Some(detail) = patch.is_detail_account {
            account.is_detail_account = detail;
        }
        if let Some(accepts) = patch.accepts_entries {
            account.accepts_entries = accepts;
        }
        if let Some(active) = patch.is_active {
            account.is_active = active;
        }

        Ok(account.clone())
    }

    /// Resolves an account by code
    pub fn resolve(&self, code: &str) -> Result<Account, LedgerError> {
        self.read()
            .by_code
            .get(code)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(format!("account {code}")))
    }

    /// Looks up an account by identifier
    pub fn get(&self, id: AccountId) -> Option<Account> {
        let state = self.read();
        let code = state.code_by_id.get(&id)?;
        state.by_code.get(code).cloned()
    }

    /// Soft-disables an account; its history remains intact
    pub fn disable(&self, code: &str) -> Result<Account, LedgerError> {
        let mut state = self.write();
        let account = state
            .by_code
            .get_mut(code)
            .ok_or_else(|| LedgerError::not_found(format!("account {code}")))?;
        account.is_active = false;
        tracing::info!(code, "account disabled");
        Ok(account.clone())
    }

    /// Physically removes an account
    ///
    /// Only callable for accounts without children; the facade additionally
    /// requires the account to have no posted lines.
    pub(crate) fn remove(&self, code: &str) -> Result<(), LedgerError> {
        let mut state = self.write();
        if !state.by_code.contains_key(code) {
            return Err(LedgerError::not_found(format!("account {code}")));
        }
        if state.has_children(code) {
            return Err(LedgerError::validation(format!(
                "account {code} has children and cannot be removed"
            )));
        }
        let removed = state.by_code.remove(code).expect("checked above");
        state.code_by_id.remove(&removed.id);
        Ok(())
    }

    /// Snapshot of all accounts, ordered by code
    pub fn accounts(&self) -> Vec<Account> {
        self.read().by_code.values().cloned().collect()
    }
}

fn validate_code(code: &str) -> Result<(), LedgerError> {
    if code.is_empty() || code.split('.').any(|segment| segment.is_empty()) {
        return Err(LedgerError::validation(format!(
            "malformed account code {code:?}"
        )));
    }
    Ok(())
}

fn creates_cycle(state: &ChartState, code: &str, new_parent: &str) -> bool {
    let mut current = Some(new_parent.to_string());
    while let Some(ancestor) = current {
        if ancestor == code {
            return true;
        }
        current = state
            .by_code
            .get(&ancestor)
            .and_then(|a| a.parent_code.clone());
    }
    false
}
