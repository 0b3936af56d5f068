use crate::errors::Result;
use crate::models::category::Category;
use crate::models::transaction::TransactionType;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use tracing::debug;

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    let type_str: String = row.get(2)?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        category_type: TransactionType::parse(&type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                Box::from(format!("unknown category type '{type_str}'")),
            )
        })?,
    })
}

pub fn insert(conn: &Connection, name: &str, category_type: TransactionType) -> Result<i64> {
    conn.execute(
        "INSERT INTO categories (name, category_type) VALUES (?1, ?2)",
        params![name, category_type.as_str()],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, name, "inserted category");
    Ok(id)
}

pub fn list_by_type(conn: &Connection, category_type: TransactionType) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category_type FROM categories WHERE category_type = ?1 ORDER BY name",
    )?;
    let categories = stmt
        .query_map(params![category_type.as_str()], row_to_category)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(categories)
}

/// Ordered by type then name, the way the manager window lists them.
pub fn list_all(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn
        .prepare("SELECT id, name, category_type FROM categories ORDER BY category_type, name")?;
    let categories = stmt
        .query_map([], row_to_category)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(categories)
}

pub fn list_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM categories ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

pub fn count_all(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
    Ok(count)
}

pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    let affected = conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
    debug!(id, affected, "deleted category");
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;

    #[test]
    fn test_insert_and_list_by_type() {
        let conn = establish_test_connection().unwrap();
        insert(&conn, "Transport", TransactionType::Expense).unwrap();
        insert(&conn, "Food", TransactionType::Expense).unwrap();
        insert(&conn, "Salary", TransactionType::Income).unwrap();

        let expenses = list_by_type(&conn, TransactionType::Expense).unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].name, "Food");
        assert_eq!(expenses[1].name, "Transport");

        let income = list_by_type(&conn, TransactionType::Income).unwrap();
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].category_type, TransactionType::Income);
    }

    #[test]
    fn test_list_all_orders_by_type_then_name() {
        let conn = establish_test_connection().unwrap();
        insert(&conn, "Salary", TransactionType::Income).unwrap();
        insert(&conn, "Transport", TransactionType::Expense).unwrap();
        insert(&conn, "Food", TransactionType::Expense).unwrap();

        let all = list_all(&conn).unwrap();
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Transport", "Salary"]);
    }

    #[test]
    fn test_list_names_is_alphabetical() {
        let conn = establish_test_connection().unwrap();
        insert(&conn, "Transport", TransactionType::Expense).unwrap();
        insert(&conn, "Business", TransactionType::Income).unwrap();
        insert(&conn, "Food", TransactionType::Expense).unwrap();

        let names = list_names(&conn).unwrap();
        assert_eq!(names, vec!["Business", "Food", "Transport"]);
    }

    #[test]
    fn test_count_and_delete() {
        let conn = establish_test_connection().unwrap();
        assert_eq!(count_all(&conn).unwrap(), 0);

        let id = insert(&conn, "Food", TransactionType::Expense).unwrap();
        assert_eq!(count_all(&conn).unwrap(), 1);

        assert_eq!(delete(&conn, id).unwrap(), 1);
        assert_eq!(count_all(&conn).unwrap(), 0);
        assert_eq!(delete(&conn, id).unwrap(), 0);
    }
}
