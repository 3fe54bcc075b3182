//! Pre-built test data
//!
//! A small but realistic dotted-code chart of accounts spanning all five
//! account types, and the standard templates most scenarios exercise.

use core_kernel::Currency;
use domain_ledger::chart::{AccountSpec, AccountType, ChartOfAccounts};
use domain_ledger::engine::GeneralLedger;
use domain_ledger::template::{AmountType, TemplateLine, TemplateSpec, TriggerType};
use rust_decimal_macros::dec;

/// Account codes of the standard chart
pub mod codes {
    pub const ASSETS: &str = "1";
    pub const CURRENT_ASSETS: &str = "1.1";
    pub const CASH: &str = "1.1.01";
    pub const BANK: &str = "1.1.02";
    pub const RECEIVABLES: &str = "1.1.03";
    pub const RETENTIONS_RECEIVABLE: &str = "1.1.04";
    pub const LIABILITIES: &str = "2";
    pub const VAT_PAYABLE: &str = "2.1.01";
    pub const RETENTIONS_PAYABLE: &str = "2.1.02";
    pub const LOANS_PAYABLE: &str = "2.2.01";
    pub const EQUITY: &str = "3";
    pub const SHARE_CAPITAL: &str = "3.1.01";
    pub const INCOME: &str = "4";
    pub const SALES: &str = "4.1.01";
    pub const EXPENSES: &str = "5";
    pub const SALARIES: &str = "5.1.01";
    pub const EMPLOYER_CHARGES: &str = "5.1.02";
    pub const INTEREST_EXPENSE: &str = "5.2.01";
    pub const GENERAL_EXPENSES: &str = "5.3.01";
}

/// Default currency used across the test suite
pub const TEST_CURRENCY: Currency = Currency::USD;

/// Template codes seeded by [`standard_templates`]
pub mod templates {
    pub const SALE_INVOICE: &str = "SALE_INVOICE_A";
    pub const CUSTOMER_PAYMENT: &str = "CUSTOMER_PAYMENT_A";
    pub const LOAN_PAYMENT: &str = "LOAN_PAYMENT_A";
    pub const SALARY_PAYMENT: &str = "SALARY_PAYMENT_A";
}

/// Seeds the standard chart into `chart`
pub fn seed_standard_chart(chart: &ChartOfAccounts) {
    let specs = vec![
        AccountSpec::group(codes::ASSETS, "Assets", AccountType::Asset),
        AccountSpec::group(codes::CURRENT_ASSETS, "Current Assets", AccountType::Asset)
            .with_parent(codes::ASSETS),
        AccountSpec::detail(codes::CASH, "Cash", AccountType::Asset)
            .with_parent(codes::CURRENT_ASSETS),
        AccountSpec::detail(codes::BANK, "Bank", AccountType::Asset)
            .with_parent(codes::CURRENT_ASSETS),
        AccountSpec::detail(codes::RECEIVABLES, "Accounts Receivable", AccountType::Asset)
            .with_parent(codes::CURRENT_ASSETS),
        AccountSpec::detail(
            codes::RETENTIONS_RECEIVABLE,
            "Tax Retentions Receivable",
            AccountType::Asset,
        )
        .with_parent(codes::CURRENT_ASSETS),
        AccountSpec::group(codes::LIABILITIES, "Liabilities", AccountType::Liability),
        AccountSpec::group("2.1", "Tax Liabilities", AccountType::Liability)
            .with_parent(codes::LIABILITIES),
        AccountSpec::detail(codes::VAT_PAYABLE, "VAT Payable", AccountType::Liability)
            .with_parent("2.1"),
        AccountSpec::detail(
            codes::RETENTIONS_PAYABLE,
            "Retentions Payable",
            AccountType::Liability,
        )
        .with_parent("2.1"),
        AccountSpec::group("2.2", "Financial Liabilities", AccountType::Liability)
            .with_parent(codes::LIABILITIES),
        AccountSpec::detail(codes::LOANS_PAYABLE, "Loans Payable", AccountType::Liability)
            .with_parent("2.2"),
        AccountSpec::group(codes::EQUITY, "Equity", AccountType::Equity),
        AccountSpec::group("3.1", "Capital", AccountType::Equity).with_parent(codes::EQUITY),
        AccountSpec::detail(codes::SHARE_CAPITAL, "Share Capital", AccountType::Equity)
            .with_parent("3.1"),
        AccountSpec::group(codes::INCOME, "Income", AccountType::Income),
        AccountSpec::group("4.1", "Operating Income", AccountType::Income)
            .with_parent(codes::INCOME),
        AccountSpec::detail(codes::SALES, "Sales", AccountType::Income).with_parent("4.1"),
        AccountSpec::group(codes::EXPENSES, "Expenses", AccountType::Expense),
        AccountSpec::group("5.1", "Personnel", AccountType::Expense)
            .with_parent(codes::EXPENSES),
        AccountSpec::detail(codes::SALARIES, "Salaries", AccountType::Expense).with_parent("5.1"),
        AccountSpec::detail(
            codes::EMPLOYER_CHARGES,
            "Employer Charges",
            AccountType::Expense,
        )
        .with_parent("5.1"),
        AccountSpec::group("5.2", "Financial Expenses", AccountType::Expense)
            .with_parent(codes::EXPENSES),
        AccountSpec::detail(codes::INTEREST_EXPENSE, "Interest Expense", AccountType::Expense)
            .with_parent("5.2"),
        AccountSpec::group("5.3", "General Expenses", AccountType::Expense)
            .with_parent(codes::EXPENSES),
        AccountSpec::detail(codes::GENERAL_EXPENSES, "General Expenses", AccountType::Expense)
            .with_parent("5.3"),
    ];

    for spec in specs {
        chart
            .create_account(spec)
            .expect("standard chart seed must be valid");
    }
}

/// The standard template set
pub fn standard_templates() -> Vec<TemplateSpec> {
    vec![
        TemplateSpec::new(
            templates::SALE_INVOICE,
            "Sale invoice",
            TriggerType::SaleInvoice,
        )
        .line(TemplateLine::debit(1, codes::RECEIVABLES, AmountType::Total))
        .line(TemplateLine::credit(2, codes::SALES, AmountType::Subtotal))
        .line(TemplateLine::credit(3, codes::VAT_PAYABLE, AmountType::Tax)),
        TemplateSpec::new(
            templates::CUSTOMER_PAYMENT,
            "Customer payment",
            TriggerType::CustomerPayment,
        )
        .line(TemplateLine::debit(1, codes::BANK, AmountType::NetPayment))
        .line(TemplateLine::debit(2, codes::RETENTIONS_RECEIVABLE, AmountType::Retention))
        .line(TemplateLine::credit(3, codes::RECEIVABLES, AmountType::Total)),
        TemplateSpec::new(
            templates::LOAN_PAYMENT,
            "Loan payment",
            TriggerType::LoanPayment,
        )
        .line(TemplateLine::debit(1, codes::LOANS_PAYABLE, AmountType::Principal))
        .line(TemplateLine::debit(2, codes::INTEREST_EXPENSE, AmountType::Interest))
        .line(TemplateLine::credit(3, codes::BANK, AmountType::NetPayment)),
        TemplateSpec::new(
            templates::SALARY_PAYMENT,
            "Salary payment",
            TriggerType::SalaryPayment,
        )
        .line(TemplateLine::debit(1, codes::SALARIES, AmountType::Total))
        .line(
            TemplateLine::debit(2, codes::EMPLOYER_CHARGES, AmountType::Percentage)
                .with_percentage(dec!(23.6)),
        )
        .line(TemplateLine::credit(3, codes::BANK, AmountType::NetPayment))
        .line(
            TemplateLine::credit(4, codes::RETENTIONS_PAYABLE, AmountType::Retention),
        )
        .line(
            TemplateLine::credit(5, "2.1.03", AmountType::Percentage).with_percentage(dec!(23.6)),
        ),
    ]
}

/// A fully seeded ledger: standard chart plus standard templates
///
/// The salary template references the social-security account `2.1.03`,
/// which is also seeded here.
pub fn standard_ledger() -> GeneralLedger {
    let ledger = GeneralLedger::new(TEST_CURRENCY);
    seed_standard_chart(ledger.chart());
    ledger
        .create_account(
            AccountSpec::detail("2.1.03", "Social Security Payable", AccountType::Liability)
                .with_parent("2.1"),
        )
        .expect("social security account must seed");
    for spec in standard_templates() {
        ledger
            .upsert_template(spec)
            .expect("standard templates must be valid");
    }
    ledger
}
