use crate::db::repository;
use crate::errors::{AppError, Result};
use crate::models::transaction::{Transaction, TransactionType};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::info;

/// Validates raw form input and persists the transaction. Returns the
/// stored record, id included, so the caller can re-render from it.
pub fn add_transaction(
    conn: &Connection,
    date: &str,
    amount: &str,
    category: &str,
    transaction_type: TransactionType,
    description: &str,
) -> Result<Transaction> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date. Use YYYY-MM-DD.".to_string()))?;

    let amount = Decimal::from_str(amount.trim())
        .map_err(|_| AppError::Validation(format!("Invalid amount '{}'.", amount.trim())))?;
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Amount must be greater than zero.".to_string(),
        ));
    }

    let category = category.trim();
    if category.is_empty() {
        return Err(AppError::Validation("Select a category.".to_string()));
    }

    let id = repository::insert(conn, date, amount, category, transaction_type, description)?;
    info!(id, %date, "transaction saved");

    Ok(Transaction {
        id,
        date,
        amount,
        category: category.to_string(),
        transaction_type,
        description: description.to_string(),
    })
}

pub fn list_all(conn: &Connection) -> Result<Vec<Transaction>> {
    repository::list_all(conn)
}

/// Month comes as `YYYY-MM` and restricts dates to the literal inclusive
/// range `YYYY-MM-01 ..= YYYY-MM-31`. The day-31 bound is intentional:
/// stored dates are always valid calendar dates, so nothing extra matches.
pub fn list_filtered(
    conn: &Connection,
    month: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<Transaction>> {
    let bounds = match month {
        Some(month) => Some(month_bounds(month)?),
        None => None,
    };
    let range = bounds.as_ref().map(|(from, to)| (from.as_str(), to.as_str()));
    repository::list_filtered(conn, range, category)
}

fn month_bounds(month: &str) -> Result<(String, String)> {
    let invalid = || AppError::Validation(format!("Invalid month '{month}'. Use YYYY-MM."));
    let (year, month_num) = month.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month_num: u32 = month_num.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month_num) {
        return Err(invalid());
    }
    Ok((
        format!("{year:04}-{month_num:02}-01"),
        format!("{year:04}-{month_num:02}-31"),
    ))
}

/// Deleting is gated on the caller's confirmation answer; a declined
/// confirmation changes nothing.
pub fn delete_transaction(conn: &Connection, id: i64, confirmed: bool) -> Result<()> {
    if !confirmed {
        return Err(AppError::ConfirmationDeclined);
    }
    repository::delete(conn, id)?;
    info!(id, "transaction deleted");
    Ok(())
}

/// Every `YYYY-MM` present across transaction dates, newest month first.
/// Lexicographic order is chronological for this format.
pub fn distinct_months(conn: &Connection) -> Result<Vec<String>> {
    let months: BTreeSet<String> = repository::distinct_dates(conn)?
        .iter()
        .filter_map(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .map(|date| date.format("%Y-%m").to_string())
        .collect();
    Ok(months.into_iter().rev().collect())
}

pub fn category_usage_count(conn: &Connection, name: &str) -> Result<i64> {
    repository::count_by_category(conn, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;

    fn add(
        conn: &Connection,
        date: &str,
        amount: &str,
        category: &str,
        kind: TransactionType,
    ) -> Transaction {
        add_transaction(conn, date, amount, category, kind, "").unwrap()
    }

    #[test]
    fn test_add_then_list_includes_record_first() {
        let conn = establish_test_connection().unwrap();
        add(&conn, "2024-01-10", "100", "Food", TransactionType::Expense);
        let latest = add(&conn, "2024-03-05", "1500", "Salary", TransactionType::Income);

        let all = list_all(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], latest);
    }

    #[test]
    fn test_add_round_trips_by_generated_id() {
        let conn = establish_test_connection().unwrap();
        let saved = add_transaction(
            &conn,
            "2024-02-29",
            "19.99",
            "Entertainment",
            TransactionType::Expense,
            "cinema tickets",
        )
        .unwrap();

        let found = repository::find_by_id(&conn, saved.id).unwrap().unwrap();
        assert_eq!(found, saved);
    }

    #[test]
    fn test_add_rejects_unparseable_amount() {
        let conn = establish_test_connection().unwrap();
        let result = add_transaction(&conn, "2024-01-01", "12,50", "Food", TransactionType::Expense, "");
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(list_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_add_rejects_non_positive_amount() {
        let conn = establish_test_connection().unwrap();
        for amount in ["0", "-5"] {
            let result =
                add_transaction(&conn, "2024-01-01", amount, "Food", TransactionType::Expense, "");
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert!(list_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_add_rejects_malformed_date() {
        let conn = establish_test_connection().unwrap();
        for date in ["2024-13-01", "2024-02-30", "01/02/2024", ""] {
            let result = add_transaction(&conn, date, "10", "Food", TransactionType::Expense, "");
            assert!(matches!(result, Err(AppError::Validation(_))), "date {date:?}");
        }
        assert!(list_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_add_rejects_empty_category() {
        let conn = establish_test_connection().unwrap();
        let result = add_transaction(&conn, "2024-01-01", "10", "  ", TransactionType::Expense, "");
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(list_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_month_filter_uses_literal_day_31_bound() {
        let conn = establish_test_connection().unwrap();
        add(&conn, "2024-01-31", "1", "Food", TransactionType::Expense);
        add(&conn, "2024-02-01", "2", "Food", TransactionType::Expense);
        add(&conn, "2024-02-28", "3", "Food", TransactionType::Expense);
        add(&conn, "2024-02-29", "4", "Food", TransactionType::Expense);
        add(&conn, "2024-03-01", "5", "Food", TransactionType::Expense);

        let rows = list_filtered(&conn, Some("2024-02"), None).unwrap();
        let dates: Vec<String> = rows
            .iter()
            .map(|t| t.date.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(dates, vec!["2024-02-29", "2024-02-28", "2024-02-01"]);
    }

    #[test]
    fn test_filters_are_anded() {
        let conn = establish_test_connection().unwrap();
        add(&conn, "2024-02-10", "1", "Food", TransactionType::Expense);
        add(&conn, "2024-02-11", "2", "Transport", TransactionType::Expense);
        add(&conn, "2024-03-10", "3", "Food", TransactionType::Expense);

        let rows = list_filtered(&conn, Some("2024-02"), Some("Food")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Food");

        let unfiltered = list_filtered(&conn, None, None).unwrap();
        assert_eq!(unfiltered.len(), 3);
    }

    #[test]
    fn test_malformed_month_is_rejected() {
        let conn = establish_test_connection().unwrap();
        for month in ["2024", "2024-00", "2024-13", "last-month"] {
            let result = list_filtered(&conn, Some(month), None);
            assert!(matches!(result, Err(AppError::Validation(_))), "month {month:?}");
        }
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let conn = establish_test_connection().unwrap();
        let tx = add(&conn, "2024-01-01", "10", "Food", TransactionType::Expense);

        let declined = delete_transaction(&conn, tx.id, false);
        assert!(matches!(declined, Err(AppError::ConfirmationDeclined)));
        assert_eq!(list_all(&conn).unwrap().len(), 1);

        delete_transaction(&conn, tx.id, true).unwrap();
        assert!(list_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_distinct_months_sorted_descending() {
        let conn = establish_test_connection().unwrap();
        add(&conn, "2024-01-10", "1", "Food", TransactionType::Expense);
        add(&conn, "2024-01-20", "2", "Food", TransactionType::Expense);
        add(&conn, "2023-12-31", "3", "Food", TransactionType::Expense);
        add(&conn, "2024-03-01", "4", "Food", TransactionType::Expense);

        let months = distinct_months(&conn).unwrap();
        assert_eq!(months, vec!["2024-03", "2024-01", "2023-12"]);
    }

    #[test]
    fn test_category_usage_count() {
        let conn = establish_test_connection().unwrap();
        add(&conn, "2024-01-10", "1", "Food", TransactionType::Expense);
        add(&conn, "2024-01-11", "2", "Food", TransactionType::Expense);

        assert_eq!(category_usage_count(&conn, "Food").unwrap(), 2);
        assert_eq!(category_usage_count(&conn, "Housing").unwrap(), 0);
    }
}
