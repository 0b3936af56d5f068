use crate::db::category_repository;
use crate::errors::{AppError, Result};
use crate::models::category::Category;
use crate::models::transaction::TransactionType;
use crate::operations::transactions;
use rusqlite::Connection;
use tracing::info;

const DEFAULT_CATEGORIES: [(&str, TransactionType); 9] = [
    ("Food", TransactionType::Expense),
    ("Transport", TransactionType::Expense),
    ("Taxes", TransactionType::Expense),
    ("Entertainment", TransactionType::Expense),
    ("Housing", TransactionType::Expense),
    ("Salary", TransactionType::Income),
    ("Business", TransactionType::Income),
    ("Investments", TransactionType::Income),
    ("Other income", TransactionType::Income),
];

/// Seeds the default category set, but only when the table holds no rows
/// at all. Called once at startup; returns whether anything was inserted.
pub fn seed_defaults_if_empty(conn: &Connection) -> Result<bool> {
    if category_repository::count_all(conn)? > 0 {
        return Ok(false);
    }
    for (name, category_type) in DEFAULT_CATEGORIES {
        category_repository::insert(conn, name, category_type)?;
    }
    info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    Ok(true)
}

pub fn add_category(conn: &Connection, name: &str, category_type: TransactionType) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Enter a category name.".to_string()));
    }
    let id = category_repository::insert(conn, name, category_type)?;
    Ok(Category {
        id,
        name: name.to_string(),
        category_type,
    })
}

/// Usage guard first, then the confirmation gate: a category still
/// referenced by transactions cannot be deleted at all.
pub fn delete_category(conn: &Connection, id: i64, name: &str, confirmed: bool) -> Result<()> {
    let used_by = transactions::category_usage_count(conn, name)?;
    if used_by > 0 {
        return Err(AppError::Conflict(used_by));
    }
    if !confirmed {
        return Err(AppError::ConfirmationDeclined);
    }
    category_repository::delete(conn, id)?;
    info!(id, name, "category deleted");
    Ok(())
}

pub fn list_by_type(conn: &Connection, category_type: TransactionType) -> Result<Vec<Category>> {
    category_repository::list_by_type(conn, category_type)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Category>> {
    category_repository::list_all(conn)
}

/// Alphabetical names for the filter controls.
pub fn list_all_names(conn: &Connection) -> Result<Vec<String>> {
    category_repository::list_names(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use crate::operations::transactions::add_transaction;

    #[test]
    fn test_seed_inserts_defaults_once() {
        let conn = establish_test_connection().unwrap();

        assert!(seed_defaults_if_empty(&conn).unwrap());
        let all = list_all(&conn).unwrap();
        assert_eq!(all.len(), 9);

        let expenses = list_by_type(&conn, TransactionType::Expense).unwrap();
        let income = list_by_type(&conn, TransactionType::Income).unwrap();
        assert_eq!(expenses.len(), 5);
        assert_eq!(income.len(), 4);

        // Second startup: nothing to do.
        assert!(!seed_defaults_if_empty(&conn).unwrap());
        assert_eq!(list_all(&conn).unwrap().len(), 9);
    }

    #[test]
    fn test_seed_skips_when_any_row_exists() {
        let conn = establish_test_connection().unwrap();
        add_category(&conn, "Pets", TransactionType::Expense).unwrap();

        assert!(!seed_defaults_if_empty(&conn).unwrap());
        let all = list_all(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Pets");
    }

    #[test]
    fn test_add_category_rejects_blank_name() {
        let conn = establish_test_connection().unwrap();
        for name in ["", "   "] {
            let result = add_category(&conn, name, TransactionType::Income);
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert!(list_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_delete_category_in_use_is_a_conflict() {
        let conn = establish_test_connection().unwrap();
        let category = add_category(&conn, "Food", TransactionType::Expense).unwrap();
        add_transaction(&conn, "2024-01-01", "10", "Food", TransactionType::Expense, "").unwrap();
        add_transaction(&conn, "2024-01-02", "20", "Food", TransactionType::Expense, "").unwrap();

        let result = delete_category(&conn, category.id, &category.name, true);
        assert!(matches!(result, Err(AppError::Conflict(2))));

        // Both tables unchanged.
        assert_eq!(list_all(&conn).unwrap().len(), 1);
        assert_eq!(crate::operations::transactions::list_all(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_unused_category_removes_only_it() {
        let conn = establish_test_connection().unwrap();
        let unused = add_category(&conn, "Gifts", TransactionType::Expense).unwrap();
        add_category(&conn, "Food", TransactionType::Expense).unwrap();
        add_transaction(&conn, "2024-01-01", "10", "Food", TransactionType::Expense, "").unwrap();

        delete_category(&conn, unused.id, &unused.name, true).unwrap();

        let remaining = list_all(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Food");
        assert_eq!(crate::operations::transactions::list_all(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_category_respects_declined_confirmation() {
        let conn = establish_test_connection().unwrap();
        let category = add_category(&conn, "Gifts", TransactionType::Expense).unwrap();

        let result = delete_category(&conn, category.id, &category.name, false);
        assert!(matches!(result, Err(AppError::ConfirmationDeclined)));
        assert_eq!(list_all(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_list_all_names_alphabetical() {
        let conn = establish_test_connection().unwrap();
        add_category(&conn, "Transport", TransactionType::Expense).unwrap();
        add_category(&conn, "Business", TransactionType::Income).unwrap();
        add_category(&conn, "Food", TransactionType::Expense).unwrap();

        let names = list_all_names(&conn).unwrap();
        assert_eq!(names, vec!["Business", "Food", "Transport"]);
    }
}
