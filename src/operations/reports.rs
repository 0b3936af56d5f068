use crate::models::transaction::{Transaction, TransactionType};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// The five aggregation views offered by the chart panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    ExpensesByCategory,
    IncomeByCategory,
    MonthlyExpenses,
    MonthlyIncome,
    Balance,
}

impl Report {
    pub const ALL: [Report; 5] = [
        Report::ExpensesByCategory,
        Report::IncomeByCategory,
        Report::MonthlyExpenses,
        Report::MonthlyIncome,
        Report::Balance,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Report::ExpensesByCategory => "Expenses by category",
            Report::IncomeByCategory => "Income by category",
            Report::MonthlyExpenses => "Monthly expenses",
            Report::MonthlyIncome => "Monthly income",
            Report::Balance => "Monthly balance (income - expense)",
        }
    }

    pub fn rows(self, transactions: &[Transaction]) -> Vec<(String, Decimal)> {
        match self {
            Report::ExpensesByCategory => sum_by_category(transactions, TransactionType::Expense),
            Report::IncomeByCategory => sum_by_category(transactions, TransactionType::Income),
            Report::MonthlyExpenses => sum_by_month(transactions, TransactionType::Expense),
            Report::MonthlyIncome => sum_by_month(transactions, TransactionType::Income),
            Report::Balance => balance_by_month(transactions),
        }
    }
}

/// Sum of amounts per category for one transaction type, smallest sum
/// first (ties broken by name) — the order the bar chart wants.
pub fn sum_by_category(
    transactions: &[Transaction],
    transaction_type: TransactionType,
) -> Vec<(String, Decimal)> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for tx in transactions {
        if tx.transaction_type == transaction_type {
            *totals.entry(tx.category.clone()).or_insert(Decimal::ZERO) += tx.amount;
        }
    }
    let mut rows: Vec<(String, Decimal)> = totals.into_iter().collect();
    rows.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

/// Sum of amounts per `YYYY-MM` month for one transaction type, in
/// chronological order.
pub fn sum_by_month(
    transactions: &[Transaction],
    transaction_type: TransactionType,
) -> Vec<(String, Decimal)> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for tx in transactions {
        if tx.transaction_type == transaction_type {
            *totals.entry(tx.month()).or_insert(Decimal::ZERO) += tx.amount;
        }
    }
    totals.into_iter().collect()
}

/// Per-month net of income minus expense. Months present on either side
/// appear in the series; the missing side counts as zero.
pub fn balance_by_month(transactions: &[Transaction]) -> Vec<(String, Decimal)> {
    let mut balance: BTreeMap<String, Decimal> = BTreeMap::new();
    for (month, sum) in sum_by_month(transactions, TransactionType::Income) {
        *balance.entry(month).or_insert(Decimal::ZERO) += sum;
    }
    for (month, sum) in sum_by_month(transactions, TransactionType::Expense) {
        *balance.entry(month).or_insert(Decimal::ZERO) -= sum;
    }
    balance.into_iter().collect()
}
