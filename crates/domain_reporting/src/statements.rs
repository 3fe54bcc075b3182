//! Financial statement builders
//!
//! Pure read-side compositions over [`LedgerAggregator`]: the balance sheet
//! at a cutoff date and the income statement over a range. Output is
//! structured numeric data; formatting belongs to the consumers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, DateRange, Money};
use domain_ledger::chart::{AccountType, ChartOfAccounts};
use domain_ledger::error::LedgerError;
use domain_ledger::journal::JournalStore;

use crate::aggregator::LedgerAggregator;

/// One account's contribution to a statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    pub account_id: AccountId,
    /// Dotted account code
    pub code: String,
    pub name: String,
    /// Hierarchy level, for consumer-side indentation
    pub level: usize,
    /// Ending balance, signed per the account's normal side
    pub balance: Money,
}

/// Balance-sheet section totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetTotals {
    pub assets: Money,
    pub liabilities: Money,
    pub equity: Money,
}

/// Balance sheet at a cutoff date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub as_of: NaiveDate,
    pub assets: Vec<StatementLine>,
    pub liabilities: Vec<StatementLine>,
    pub equity: Vec<StatementLine>,
    /// Net result of the open period, folded into equity
    pub period_result: Money,
    pub totals: BalanceSheetTotals,
}

impl BalanceSheet {
    /// The accounting equation, within one minimum currency unit:
    /// assets == liabilities + equity + period_result
    pub fn equation_holds(&self) -> bool {
        let rhs = self.totals.liabilities.amount()
            + self.totals.equity.amount()
            + self.period_result.amount();
        let epsilon = self.totals.assets.currency().minimum_unit();
        (self.totals.assets.amount() - rhs).abs() <= epsilon
    }
}

/// Income-statement totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeTotals {
    pub income: Money,
    pub expense: Money,
    /// income - expense
    pub result: Money,
}

/// Income statement over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub range: DateRange,
    pub income: Vec<StatementLine>,
    pub expense: Vec<StatementLine>,
    pub totals: IncomeTotals,
}

/// Builds financial statements from the posted journal
///
/// Stateless; every call re-derives from committed posted entries.
pub struct StatementBuilder<'a> {
    chart: &'a ChartOfAccounts,
    journal: &'a JournalStore,
}

impl<'a> StatementBuilder<'a> {
    pub fn new(chart: &'a ChartOfAccounts, journal: &'a JournalStore) -> Self {
        Self { chart, journal }
    }

    /// Balance sheet at `cutoff`, using inception-to-date balances
    ///
    /// `period_result` carries the income-statement result of the open
    /// period (inception to cutoff; there is no closing-entry mechanism)
    /// so the accounting equation closes.
    pub fn balance_sheet(&self, cutoff: NaiveDate) -> Result<BalanceSheet, LedgerError> {
        let range = DateRange::through(cutoff);
        let aggregator = LedgerAggregator::new(self.chart, self.journal);
        let currency = self.journal.currency();

        let mut assets = Vec::new();
        let mut liabilities = Vec::new();
        let mut equity = Vec::new();
        let mut income_total = Money::zero(currency);
        let mut expense_total = Money::zero(currency);

        for account_id in aggregator.accounts_with_movements(range) {
            let account = self
                .chart
                .get(account_id)
                .ok_or_else(|| LedgerError::not_found(format!("account {account_id}")))?;
            let balance = aggregator.account_balance(account_id, range)?;

            let line = StatementLine {
                account_id,
                code: account.code.clone(),
                name: account.name.clone(),
                level: account.level(),
                balance,
            };

            match account.account_type {
                AccountType::Asset => assets.push(line),
                AccountType::Liability => liabilities.push(line),
                AccountType::Equity => equity.push(line),
                AccountType::Income => income_total = income_total.checked_add(&balance)?,
                AccountType::Expense => expense_total = expense_total.checked_add(&balance)?,
            }
        }

        for section in [&mut assets, &mut liabilities, &mut equity] {
            section.sort_by(|a, b| a.code.cmp(&b.code));
        }

        let totals = BalanceSheetTotals {
            assets: section_total(&assets, currency)?,
            liabilities: section_total(&liabilities, currency)?,
            equity: section_total(&equity, currency)?,
        };
        let period_result = income_total.checked_sub(&expense_total)?;

        Ok(BalanceSheet {
            as_of: cutoff,
            assets,
            liabilities,
            equity,
            period_result,
            totals,
        })
    }

    /// Income statement over `range`
    pub fn income_statement(&self, range: DateRange) -> Result<IncomeStatement, LedgerError> {
        let aggregator = LedgerAggregator::new(self.chart, self.journal);
        let currency = self.journal.currency();

        let mut income = Vec::new();
        let mut expense = Vec::new();

        for account_id in aggregator.accounts_with_movements(range) {
            let account = self
                .chart
                .get(account_id)
                .ok_or_else(|| LedgerError::not_found(format!("account {account_id}")))?;

            let section = match account.account_type {
                AccountType::Income => &mut income,
                AccountType::Expense => &mut expense,
                _ => continue,
            };

            let balance = aggregator.account_balance(account_id, range)?;
            section.push(StatementLine {
                account_id,
                code: account.code.clone(),
                name: account.name.clone(),
                level: account.level(),
                balance,
            });
        }

        income.sort_by(|a, b| a.code.cmp(&b.code));
        expense.sort_by(|a, b| a.code.cmp(&b.code));

        let income_total = section_total(&income, currency)?;
        let expense_total = section_total(&expense, currency)?;
        let result = income_total.checked_sub(&expense_total)?;

        Ok(IncomeStatement {
            range,
            income,
            expense,
            totals: IncomeTotals {
                income: income_total,
                expense: expense_total,
                result,
            },
        })
    }
}

fn section_total(
    lines: &[StatementLine],
    currency: core_kernel::Currency,
) -> Result<Money, LedgerError> {
    let balances: Vec<Money> = lines.iter().map(|l| l.balance).collect();
    Ok(Money::sum(&balances, currency)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use domain_ledger::chart::AccountSpec;
    use domain_ledger::journal::{PostingMode, ProposedEntry};
    use rust_decimal_macros::dec;

    const CURRENCY: Currency = Currency::USD;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        chart: ChartOfAccounts,
        journal: JournalStore,
        cash: AccountId,
        capital: AccountId,
        sales: AccountId,
        rent: AccountId,
    }

    fn fixture() -> Fixture {
        let chart = ChartOfAccounts::new();
        for spec in [
            AccountSpec::group("1", "Assets", AccountType::Asset),
            AccountSpec::group("2", "Liabilities", AccountType::Liability),
            AccountSpec::group("3", "Equity", AccountType::Equity),
            AccountSpec::group("4", "Income", AccountType::Income),
            AccountSpec::group("5", "Expenses", AccountType::Expense),
        ] {
            chart.create_account(spec).unwrap();
        }
        let cash = chart
            .create_account(AccountSpec::detail("1.1", "Cash", AccountType::Asset).with_parent("1"))
            .unwrap();
        let capital = chart
            .create_account(
                AccountSpec::detail("3.1", "Share Capital", AccountType::Equity).with_parent("3"),
            )
            .unwrap();
        let sales = chart
            .create_account(AccountSpec::detail("4.1", "Sales", AccountType::Income).with_parent("4"))
            .unwrap();
        let rent = chart
            .create_account(AccountSpec::detail("5.1", "Rent", AccountType::Expense).with_parent("5"))
            .unwrap();

        Fixture {
            chart,
            journal: JournalStore::new(CURRENCY),
            cash: cash.id,
            capital: capital.id,
            sales: sales.id,
            rent: rent.id,
        }
    }

    fn post(f: &Fixture, d: NaiveDate, desc: &str, debit: AccountId, credit: AccountId, amount: rust_decimal::Decimal) {
        f.journal
            .create(
                &f.chart,
                ProposedEntry::new(d, desc)
                    .debit(debit, Money::new(amount, CURRENCY))
                    .credit(credit, Money::new(amount, CURRENCY)),
                PostingMode::Posted,
            )
            .unwrap();
    }

    fn seed_activity(f: &Fixture) {
        // Owner funds the company, sells services, pays rent.
        post(f, date(2024, 1, 2), "Initial capital", f.cash, f.capital, dec!(10000));
        post(f, date(2024, 2, 5), "Service revenue", f.cash, f.sales, dec!(2500));
        post(f, date(2024, 2, 20), "Office rent", f.rent, f.cash, dec!(800));
    }

    #[test]
    fn balance_sheet_satisfies_accounting_equation() {
        let f = fixture();
        seed_activity(&f);

        let builder = StatementBuilder::new(&f.chart, &f.journal);
        let sheet = builder.balance_sheet(date(2024, 12, 31)).unwrap();

        assert_eq!(sheet.totals.assets.amount(), dec!(11700));
        assert_eq!(sheet.totals.equity.amount(), dec!(10000));
        assert_eq!(sheet.period_result.amount(), dec!(1700));
        assert!(sheet.equation_holds());
    }

    #[test]
    fn balance_sheet_respects_cutoff() {
        let f = fixture();
        seed_activity(&f);

        let builder = StatementBuilder::new(&f.chart, &f.journal);
        let sheet = builder.balance_sheet(date(2024, 1, 31)).unwrap();

        // Only the capital contribution exists at the January cutoff.
        assert_eq!(sheet.totals.assets.amount(), dec!(10000));
        assert_eq!(sheet.period_result.amount(), dec!(0));
        assert!(sheet.equation_holds());
    }

    #[test]
    fn income_statement_sums_income_and_expense() {
        let f = fixture();
        seed_activity(&f);

        let builder = StatementBuilder::new(&f.chart, &f.journal);
        let range = DateRange::between(date(2024, 2, 1), date(2024, 2, 28)).unwrap();
        let statement = builder.income_statement(range).unwrap();

        assert_eq!(statement.totals.income.amount(), dec!(2500));
        assert_eq!(statement.totals.expense.amount(), dec!(800));
        assert_eq!(statement.totals.result.amount(), dec!(1700));
        assert_eq!(statement.income.len(), 1);
        assert_eq!(statement.expense.len(), 1);
        assert_eq!(statement.income[0].code, "4.1");
    }

    #[test]
    fn statements_skip_accounts_without_movements() {
        let f = fixture();
        seed_activity(&f);
        f.chart
            .create_account(
                AccountSpec::detail("1.2", "Receivables", AccountType::Asset).with_parent("1"),
            )
            .unwrap();

        let builder = StatementBuilder::new(&f.chart, &f.journal);
        let sheet = builder.balance_sheet(date(2024, 12, 31)).unwrap();

        assert!(sheet.assets.iter().all(|l| l.code != "1.2"));
    }

    #[test]
    fn voiding_restores_statements_to_prior_state() {
        let f = fixture();
        seed_activity(&f);

        let builder = StatementBuilder::new(&f.chart, &f.journal);
        let before = builder.balance_sheet(date(2024, 12, 31)).unwrap();

        // Post and then void a large sale; the sheet must be unchanged.
        let entry = f
            .journal
            .create(
                &f.chart,
                ProposedEntry::new(date(2024, 3, 1), "Big sale")
                    .debit(f.cash, Money::new(dec!(5000), CURRENCY))
                    .credit(f.sales, Money::new(dec!(5000), CURRENCY)),
                PostingMode::Posted,
            )
            .unwrap();
        f.journal.void(entry.id, "entered twice").unwrap();

        let after = builder.balance_sheet(date(2024, 12, 31)).unwrap();
        assert_eq!(before.totals.assets, after.totals.assets);
        assert_eq!(before.period_result, after.period_result);
        assert!(after.equation_holds());
    }
}
