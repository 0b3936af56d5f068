use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Database/storage spelling, also used on the wire between widgets.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }

    /// Human-facing label for table cells and forms.
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            TransactionType::Income => TransactionType::Expense,
            TransactionType::Expense => TransactionType::Income,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub transaction_type: TransactionType,
    pub description: String,
}

impl Transaction {
    /// Amount with the sign prefix implied by the transaction type,
    /// e.g. "+1500.00" for income and "-3.50" for an expense.
    pub fn signed_amount(&self) -> String {
        match self.transaction_type {
            TransactionType::Income => format!("+{:.2}", self.amount),
            TransactionType::Expense => format!("-{:.2}", self.amount),
        }
    }

    /// The `YYYY-MM` bucket this transaction falls into.
    pub fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}
