//! Sets up the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, record::create_invoice_table};

/// Create the tables for the application's domain models.
///
/// The schema is created inside an exclusive transaction so that concurrent
/// startup against the same database file cannot observe a half-built schema.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL
/// error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_invoice_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
