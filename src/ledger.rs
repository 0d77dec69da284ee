//! The service object that owns the ledger database.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    category::{self, Category, CategoryName},
    database_id::{CategoryId, TransactionId},
    db::initialize,
    direction::Direction,
    summary::{self, MonthSummary},
    transaction::{
        self, NewTransaction, Transaction, TransactionQuery, TransactionUpdate, TransactionView,
        to_views,
    },
};

/// A handle to an open ledger.
///
/// Cloning a `Ledger` clones the handle, not the database: every clone shares
/// one connection and each operation holds the connection's lock for its
/// whole duration. Separate calls to [Ledger::open] on the same file are not
/// coordinated with each other.
#[derive(Debug, Clone)]
pub struct Ledger {
    connection: Arc<Mutex<Connection>>,
}

impl Ledger {
    /// Open or create the ledger database at `path`.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the file cannot be opened or the tables
    /// cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let connection = Connection::open(path)?;

        tracing::debug!("opened ledger database at {}", path.display());

        Self::from_connection(connection)
    }

    /// Open a ledger that lives only in memory.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the tables cannot be created.
    pub fn open_in_memory() -> Result<Self, Error> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating the tables if needed.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the tables cannot be created.
    pub fn from_connection(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Close this handle.
    ///
    /// The connection is closed once the last clone of the handle is closed or
    /// dropped.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the lock was poisoned,
    /// - or [Error::SqlError] if SQLite could not close the connection.
    pub fn close(self) -> Result<(), Error> {
        let connection = match Arc::try_unwrap(self.connection) {
            Ok(connection) => connection,
            Err(_) => {
                tracing::debug!("ledger handle closed, other handles keep the connection open");
                return Ok(());
            }
        };

        connection
            .into_inner()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?
            .close()
            .map_err(|(_, error)| Error::from(error))?;

        tracing::debug!("closed ledger database");

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }

    // ------------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------------

    /// Add a category.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyCategoryName] if `name` is empty or only whitespace,
    /// - [Error::DuplicateCategoryName] if the name is already used,
    /// - or a storage error.
    pub fn add_category(&self, name: &str, default_type: Direction) -> Result<Category, Error> {
        let name = CategoryName::new(name)?;

        category::create_category(name, default_type, &*self.lock()?)
    }

    /// Rename a category and/or change its default direction.
    ///
    /// Returns `Ok(None)` if `id` does not refer to a category.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyCategoryName] if `new_name` is empty or only whitespace,
    /// - [Error::DuplicateCategoryName] if another category uses `new_name`,
    /// - or a storage error.
    pub fn update_category(
        &self,
        id: CategoryId,
        new_name: Option<&str>,
        new_default_type: Option<Direction>,
    ) -> Result<Option<Category>, Error> {
        let new_name = new_name.map(CategoryName::new).transpose()?;

        category::update_category(id, new_name, new_default_type, &*self.lock()?)
    }

    /// Delete the category called `name` along with all of its transactions.
    ///
    /// Returns whether the category existed.
    ///
    /// # Errors
    /// Returns a storage error, in which case nothing is deleted.
    pub fn delete_category(&self, name: &str) -> Result<bool, Error> {
        let connection = self.lock()?;

        match category::find_category_by_name(name.trim(), &connection)? {
            Some(found) => category::delete_category(found.id, &connection),
            None => Ok(false),
        }
    }

    /// All categories ordered by name.
    ///
    /// # Errors
    /// Returns a storage error.
    pub fn list_categories(&self) -> Result<Vec<Category>, Error> {
        category::get_all_categories(&*self.lock()?)
    }

    /// The category called `name`, if there is one.
    ///
    /// # Errors
    /// Returns a storage error.
    pub fn find_category(&self, name: &str) -> Result<Option<Category>, Error> {
        category::find_category_by_name(name.trim(), &*self.lock()?)
    }

    // ------------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------------

    /// Record a transaction in the category called `category_name`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the amount is not finite,
    /// - [Error::UnknownCategory] if no category has that name,
    /// - or a storage error.
    pub fn add_transaction(
        &self,
        category_name: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, Error> {
        transaction::validate_amount(new_transaction.amount)?;

        let connection = self.lock()?;
        let category = category::find_category_by_name(category_name.trim(), &connection)?
            .ok_or_else(|| Error::UnknownCategory(category_name.trim().to_owned()))?;

        transaction::create_transaction(category.id, new_transaction, &connection)
    }

    /// The transaction `id`, if it exists.
    ///
    /// # Errors
    /// Returns a storage error.
    pub fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        transaction::get_transaction(id, &*self.lock()?)
    }

    /// Apply `update` to the transaction `id`.
    ///
    /// Returns `Ok(None)` if `id` does not refer to a transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the new amount is not finite,
    /// - [Error::InvalidCategoryId] if the new category does not exist,
    /// - or a storage error.
    pub fn update_transaction(
        &self,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<Option<Transaction>, Error> {
        transaction::update_transaction(id, update, &*self.lock()?)
    }

    /// Delete the transaction `id`, returning whether it existed.
    ///
    /// # Errors
    /// Returns a storage error.
    pub fn delete_transaction(&self, id: TransactionId) -> Result<bool, Error> {
        transaction::delete_transaction(id, &*self.lock()?)
    }

    /// Find transactions matching `query`, rendered for display.
    ///
    /// # Errors
    /// Returns a storage error.
    pub fn query_transactions(&self, query: &TransactionQuery) -> Result<Vec<TransactionView>, Error> {
        let connection = self.lock()?;
        let transactions = transaction::query_transactions(query, &connection)?;

        to_views(&transactions, &connection)
    }

    /// Render one transaction for display, looking up only its own category.
    ///
    /// # Errors
    /// Returns a storage error.
    pub fn view_transaction(&self, transaction: &Transaction) -> Result<TransactionView, Error> {
        let category_name = match category::get_category(transaction.category_id, &*self.lock()?) {
            Ok(category) => Some(category.name),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        };

        Ok(TransactionView::new(
            transaction,
            category_name.as_ref().map(|name| name.as_ref()),
        ))
    }

    // ------------------------------------------------------------------------
    // Summaries
    // ------------------------------------------------------------------------

    /// Summarise each month of `year`, keyed by "YYYY-MM".
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidYear] if `year` cannot be summarised,
    /// - or a storage error.
    pub fn monthly_summary(&self, year: i32) -> Result<BTreeMap<String, MonthSummary>, Error> {
        summary::monthly_summary(year, &*self.lock()?)
    }

    /// The total of every transaction, per direction.
    ///
    /// # Errors
    /// Returns a storage error.
    pub fn totals_by_direction(&self) -> Result<BTreeMap<Direction, Decimal>, Error> {
        summary::totals_by_direction(&*self.lock()?)
    }
}
