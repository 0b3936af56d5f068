use crate::models::transaction::TransactionType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub category_type: TransactionType,
}
