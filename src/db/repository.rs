use crate::errors::Result;
use crate::models::transaction::{Transaction, TransactionType};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

const COLUMNS: &str = "id, date, amount, category, transaction_type, description";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(1)?;
    let amount_str: String = row.get(2)?;
    let type_str: String = row.get(4)?;

    Ok(Transaction {
        id: row.get(0)?,
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?,
        amount: Decimal::from_str(&amount_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        category: row.get(3)?,
        transaction_type: TransactionType::parse(&type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                Box::from(format!("unknown transaction type '{type_str}'")),
            )
        })?,
        description: row.get(5)?,
    })
}

/// Inserts a transaction and returns the id generated by the database.
pub fn insert(
    conn: &Connection,
    date: NaiveDate,
    amount: Decimal,
    category: &str,
    transaction_type: TransactionType,
    description: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (date, amount, category, transaction_type, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            date.format("%Y-%m-%d").to_string(),
            amount.to_string(),
            category,
            transaction_type.as_str(),
            description,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, "inserted transaction");
    Ok(id)
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM transactions WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id], row_to_transaction)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// All transactions, most recent first. Same-date rows keep insertion
/// order with the newest on top.
pub fn list_all(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM transactions ORDER BY date DESC, id DESC"
    ))?;
    let transactions = stmt
        .query_map([], row_to_transaction)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(transactions)
}

/// Date bounds are inclusive TEXT comparisons; the caller decides what the
/// bounds look like. Category matches by exact name.
pub fn list_filtered(
    conn: &Connection,
    date_range: Option<(&str, &str)>,
    category: Option<&str>,
) -> Result<Vec<Transaction>> {
    let order = "ORDER BY date DESC, id DESC";
    let transactions = match (date_range, category) {
        (Some((from, to)), Some(name)) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM transactions
                 WHERE date >= ?1 AND date <= ?2 AND category = ?3 {order}"
            ))?;
            stmt.query_map(params![from, to, name], row_to_transaction)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        }
        (Some((from, to)), None) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM transactions WHERE date >= ?1 AND date <= ?2 {order}"
            ))?;
            stmt.query_map(params![from, to], row_to_transaction)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        }
        (None, Some(name)) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM transactions WHERE category = ?1 {order}"
            ))?;
            stmt.query_map(params![name], row_to_transaction)?
                .collect::<rusqlite::Result<Vec<_>>>()?
        }
        (None, None) => list_all(conn)?,
    };
    Ok(transactions)
}

/// Removes the row; returns how many rows were affected (0 when the id is
/// already gone).
pub fn delete(conn: &Connection, id: i64) -> Result<usize> {
    let affected = conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
    debug!(id, affected, "deleted transaction");
    Ok(affected)
}

pub fn distinct_dates(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT date FROM transactions")?;
    let dates = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(dates)
}

pub fn count_by_category(conn: &Connection, name: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE category = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count)
}
