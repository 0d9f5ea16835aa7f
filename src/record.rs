//! Record management for the invoice keeping service.
//!
//! This module contains everything related to stored records:
//! - The `Record` model and `NewRecord` for creating records
//! - Database functions for inserting, listing and counting records

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// Whether a record tracks money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Money earned, e.g. salary or an invoice paid by a client.
    Income,
    /// Money spent, e.g. a purchase backed by a receipt.
    Expense,
}

impl RecordKind {
    /// The lowercase text form stored in the database and serialized to JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
        }
    }
}

impl ToSql for RecordKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for RecordKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(RecordKind::Income),
            "expense" => Ok(RecordKind::Expense),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// One persisted invoice/expense/income metadata row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The ID of the record.
    pub id: i64,
    /// The expense or income name.
    pub name: String,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// When the income or expense occurred. Stored verbatim as submitted,
    /// not validated as a date.
    pub date: String,
    /// Whether this record is an income or an expense.
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// The income source, or the expense category.
    pub source_or_category: String,
    /// How the expense was paid. Only populated for expenses.
    pub payment_method: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// The generated name of the attached file in the file store, if a file
    /// was uploaded with the record.
    pub filename: Option<String>,
    /// When the record was created on the server.
    #[serde(with = "time::serde::iso8601")]
    pub uploaded_at: OffsetDateTime,
}

/// The fields needed to create a [Record].
///
/// The ID and upload timestamp are assigned by [insert_record].
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// The expense or income name.
    pub name: String,
    /// The amount of money earned or spent.
    pub amount: f64,
    /// When the income or expense occurred, stored verbatim.
    pub date: String,
    /// Whether this record is an income or an expense.
    pub kind: RecordKind,
    /// The income source, or the expense category.
    pub source_or_category: String,
    /// How the expense was paid. Only populated for expenses.
    pub payment_method: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// The generated name of the attached file, if any. The file must
    /// already exist in the file store before the record is inserted.
    pub filename: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Insert a new record into the database.
///
/// The ID is assigned by the database and `uploaded_at` is set to the current
/// UTC time. A failed insert leaves no row behind.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an unexpected
/// SQL error.
pub fn insert_record(new_record: NewRecord, connection: &Connection) -> Result<Record, Error> {
    let record = connection
        .prepare(
            "INSERT INTO invoices
             (name, amount, date, type, source_or_category, payment_method, notes, filename, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, name, amount, date, type, source_or_category, payment_method, notes,
                       filename, uploaded_at",
        )?
        .query_row(
            (
                new_record.name,
                new_record.amount,
                new_record.date,
                new_record.kind,
                new_record.source_or_category,
                new_record.payment_method,
                new_record.notes,
                new_record.filename,
                OffsetDateTime::now_utc(),
            ),
            map_record_row,
        )?;

    Ok(record)
}

/// Get every record in the database, newest upload first.
///
/// An empty table yields an empty vec, not an error.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is a SQL error.
pub fn list_records(connection: &Connection) -> Result<Vec<Record>, Error> {
    connection
        .prepare(
            "SELECT id, name, amount, date, type, source_or_category, payment_method, notes,
                    filename, uploaded_at
             FROM invoices
             ORDER BY uploaded_at DESC, id DESC",
        )?
        .query_map([], map_record_row)?
        .map(|record_result| record_result.map_err(Error::SqlError))
        .collect()
}

/// Get the total number of records in the database.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn count_records(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM invoices;", [], |row| {
            row.get(0).map(|count: i64| count as usize)
        })
        .map_err(|error| error.into())
}

/// Create the invoices table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS invoices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL,
                source_or_category TEXT NOT NULL,
                payment_method TEXT,
                notes TEXT,
                filename TEXT,
                uploaded_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Record].
fn map_record_row(row: &Row) -> Result<Record, rusqlite::Error> {
    Ok(Record {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        kind: row.get(4)?,
        source_or_category: row.get(5)?,
        payment_method: row.get(6)?,
        notes: row.get(7)?,
        filename: row.get(8)?,
        uploaded_at: row.get(9)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
