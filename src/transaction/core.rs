//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, OptionalExtension, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::{
    Error,
    database_id::{CategoryId, TransactionId},
    direction::Direction,
    error::is_foreign_key_violation,
    summary::to_decimal,
    timestamp::{self, from_storage_text, to_storage_text, truncate_to_micros},
};

// ============================================================================
// MODELS
// ============================================================================

/// A single monetary event filed under a category.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// Whether the money came in, went out, or is owed.
    ///
    /// Resolved from the category's default when the transaction was created
    /// and stored from then on.
    pub actual_type: Direction,
    /// The amount of money involved.
    pub amount: f64,
    /// A free text note.
    pub note: Option<String>,
    /// When the transaction happened (UTC).
    pub timestamp: PrimitiveDateTime,
}

impl Transaction {
    /// Start describing a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(amount: f64) -> NewTransaction {
        NewTransaction {
            amount,
            actual_type: None,
            note: None,
            timestamp: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```
/// use time::macros::datetime;
///
/// use finance_ledger::{Direction, Transaction};
///
/// let new_transaction = Transaction::build(5000.0)
///     .direction(Direction::Income)
///     .note("October salary")
///     .timestamp(datetime!(2025-10-01 09:00));
///
/// assert_eq!(new_transaction.actual_type, Some(Direction::Income));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct NewTransaction {
    /// The monetary amount of the transaction. Must be finite.
    pub amount: f64,

    /// The direction of the transaction.
    ///
    /// Defaults to the category's default direction if not specified.
    pub actual_type: Option<Direction>,

    /// An optional free text note.
    pub note: Option<String>,

    /// When the transaction happened.
    ///
    /// Defaults to the current UTC time if not specified. Anything finer than
    /// a microsecond is dropped.
    pub timestamp: Option<PrimitiveDateTime>,
}

impl NewTransaction {
    /// Set the direction, overriding the category default.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.actual_type = Some(direction);
        self
    }

    /// Attach a note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Set when the transaction happened.
    pub fn timestamp(mut self, timestamp: PrimitiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A sparse set of changes to an existing transaction.
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct TransactionUpdate {
    /// Move the transaction to another category.
    pub category_id: Option<CategoryId>,
    /// Replace the direction.
    pub actual_type: Option<Direction>,
    /// Replace the amount. Must be finite.
    pub amount: Option<f64>,
    /// Replace the note.
    pub note: Option<String>,
    /// Replace the timestamp.
    pub timestamp: Option<PrimitiveDateTime>,
}

impl TransactionUpdate {
    /// Returns true if the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Check that `amount` can be stored and later summed as a decimal.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `amount` is NaN, infinite, or too large
/// for a decimal.
pub fn validate_amount(amount: f64) -> Result<f64, Error> {
    to_decimal(amount)?;

    Ok(amount)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub(super) const TRANSACTION_COLUMNS: &str = "id, category_id, actual_type, amount, note, timestamp";

/// Create a new transaction in the database.
///
/// If `new_transaction` has no direction, the category's default direction is
/// stored with the transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not a finite number,
/// - or [Error::InvalidCategoryId] if `category_id` does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    category_id: CategoryId,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = validate_amount(new_transaction.amount)?;
    let timestamp = truncate_to_micros(new_transaction.timestamp.unwrap_or_else(timestamp::now));
    let timestamp_text = to_storage_text(timestamp)?;

    let transaction = connection.unchecked_transaction()?;

    let default_type: Direction = transaction
        .query_row(
            "SELECT default_type FROM category WHERE id = ?1",
            [category_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(Error::InvalidCategoryId(category_id))?;

    let actual_type = new_transaction.actual_type.unwrap_or(default_type);

    let created = transaction
        .prepare(&format!(
            "INSERT INTO \"transaction\" (category_id, actual_type, amount, note, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                category_id,
                actual_type,
                amount,
                new_transaction.note,
                timestamp_text,
            ),
            map_transaction_row,
        )
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                Error::InvalidCategoryId(category_id)
            } else {
                error.into()
            }
        })?;

    transaction.commit()?;

    tracing::info!(
        "created transaction {} in category {category_id}: {} {amount}",
        created.id,
        created.actual_type
    );

    Ok(created)
}

/// Retrieve a transaction from the database by its `id`.
///
/// Returns `Ok(None)` if `id` does not refer to a transaction.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve every transaction in storage order.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" ORDER BY id ASC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(|error| error.into()))
        .collect()
}

/// Apply `update` to the transaction `id`.
///
/// Returns the updated transaction, or `Ok(None)` if `id` does not refer to a
/// transaction. All changes are written in one SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the new amount is not a finite number,
/// - or [Error::InvalidCategoryId] if the new category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    if let Some(amount) = update.amount {
        validate_amount(amount)?;
    }

    let transaction = connection.unchecked_transaction()?;

    let Some(current) = get_transaction(id, &transaction)? else {
        return Ok(None);
    };

    if let Some(category_id) = update.category_id {
        let category_exists: bool = transaction.query_row(
            "SELECT EXISTS (SELECT 1 FROM category WHERE id = ?1)",
            [category_id],
            |row| row.get(0),
        )?;

        if !category_exists {
            return Err(Error::InvalidCategoryId(category_id));
        }
    }

    let updated = Transaction {
        id,
        category_id: update.category_id.unwrap_or(current.category_id),
        actual_type: update.actual_type.unwrap_or(current.actual_type),
        amount: update.amount.unwrap_or(current.amount),
        note: update.note.or(current.note),
        timestamp: update
            .timestamp
            .map(truncate_to_micros)
            .unwrap_or(current.timestamp),
    };

    transaction.execute(
        "UPDATE \"transaction\"
         SET category_id = ?1, actual_type = ?2, amount = ?3, note = ?4, timestamp = ?5
         WHERE id = ?6",
        (
            updated.category_id,
            updated.actual_type,
            updated.amount,
            updated.note.as_deref(),
            to_storage_text(updated.timestamp)?,
            id,
        ),
    )?;

    transaction.commit()?;

    tracing::info!("updated transaction {id}");

    Ok(Some(updated))
}

/// Delete the transaction `id`.
///
/// Returns whether the transaction existed.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<bool, Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected > 0 {
        tracing::info!("deleted transaction {id}");
    }

    Ok(rows_affected > 0)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER NOT NULL,
                actual_type TEXT NOT NULL,
                amount REAL NOT NULL,
                note TEXT,
                timestamp TEXT NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Indexes used by the date range and category filters.
    connection.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_transaction_timestamp ON \"transaction\"(timestamp);
         CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order of `TRANSACTION_COLUMNS`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let category_id = row.get(1)?;
    let actual_type = row.get(2)?;
    let amount = row.get(3)?;
    let note = row.get(4)?;
    let raw_timestamp: String = row.get(5)?;
    let timestamp = from_storage_text(&raw_timestamp)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(error)))?;

    Ok(Transaction {
        id,
        category_id,
        actual_type,
        amount,
        note,
        timestamp,
    })
}

// ============================================================================
// TESTS
// ============================================================================
