//! Sets up the ledger's SQLite schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{category::create_category_table, transaction::create_transaction_table};

/// Enable foreign keys and create all tables and indexes that do not exist yet.
///
/// Foreign key enforcement is a per-connection setting in SQLite, so this must
/// be called on every connection the ledger uses.
///
/// # Errors
/// Returns an error if the pragma cannot be set or a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
