use crate::errors::Result;
use rusqlite::Connection;
use tracing::debug;

/// Opens (or creates) the database file and makes sure the schema exists.
/// The returned connection is the single process-wide handle; every
/// repository call borrows it.
pub fn establish_connection(path: &str) -> Result<Connection> {
    debug!(path, "opening database");
    let conn = Connection::open(path)?;
    create_schema_if_absent(&conn)?;
    Ok(conn)
}

/// There is deliberately no foreign key from transactions.category to
/// categories.name: the reference is by name only and integrity is
/// enforced in the category service.
fn create_schema_if_absent(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            amount TEXT NOT NULL,
            category TEXT NOT NULL,
            transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
            description TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category_type TEXT NOT NULL CHECK (category_type IN ('income', 'expense'))
        )",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema_if_absent(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository;
    use crate::models::transaction::TransactionType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn test_schema_is_created_in_memory() {
        let conn = establish_test_connection().unwrap();
        let transactions = repository::list_all(&conn).unwrap();
        assert!(transactions.is_empty());
    }

    #[test]
    fn test_reopen_keeps_schema_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db");
        let path = path.to_str().unwrap();

        {
            let conn = establish_connection(path).unwrap();
            repository::insert(
                &conn,
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                Decimal::new(500, 1),
                "Food",
                TransactionType::Expense,
                "groceries",
            )
            .unwrap();
        }

        let conn = establish_connection(path).unwrap();
        let transactions = repository::list_all(&conn).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].category, "Food");
    }

    #[test]
    fn test_type_check_constraint_rejects_unknown_kind() {
        let conn = establish_test_connection().unwrap();
        let result = conn.execute(
            "INSERT INTO transactions (date, amount, category, transaction_type, description)
             VALUES ('2024-01-01', '1', 'Food', 'transfer', '')",
            [],
        );
        assert!(result.is_err());
    }
}
