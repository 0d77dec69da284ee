//! Defines the crate level error type and how SQLite errors map onto it.

use crate::database_id::CategoryId;

/// The broad class an [Error] belongs to.
///
/// Front ends can use this to decide how to report an error without matching
/// on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed a value with the wrong shape, e.g. an empty name.
    Validation,
    /// A referenced category or transaction does not exist.
    NotFound,
    /// The write would break a uniqueness constraint.
    Conflict,
    /// The underlying storage failed.
    Storage,
}

/// The errors that may occur in the ledger.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used as a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// The amount is not a finite number or does not fit in a decimal.
    #[error("{0} is not a valid amount")]
    InvalidAmount(f64),

    /// A summary total grew beyond what a decimal can hold.
    #[error("the total is too large to represent as a decimal")]
    AmountOverflow,

    /// The string does not name a direction.
    #[error("\"{0}\" is not a valid direction, expected one of Income, Expenditure, Receivable or Payable")]
    InvalidDirection(String),

    /// The string does not name a sortable transaction field.
    #[error("\"{0}\" is not a valid sort field, expected one of timestamp, amount, id, category_id or direction")]
    InvalidSortField(String),

    /// A timestamp could not be parsed or is out of range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The year cannot be summarised because its months cannot be represented.
    #[error("{0} is not a valid year")]
    InvalidYear(i32),

    /// No category has the given name.
    #[error("could not find a category named \"{0}\"")]
    UnknownCategory(String),

    /// The category ID used to create or update a transaction did not match a
    /// valid category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategoryId(CategoryId),

    /// The requested row was not found.
    ///
    /// Internally, this error occurs when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The category name is already used by another category.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyCategoryName
            | Error::InvalidAmount(_)
            | Error::AmountOverflow
            | Error::InvalidDirection(_)
            | Error::InvalidSortField(_)
            | Error::InvalidTimestamp(_)
            | Error::InvalidYear(_) => ErrorKind::Validation,
            Error::UnknownCategory(_) | Error::InvalidCategoryId(_) | Error::NotFound => {
                ErrorKind::NotFound
            }
            Error::DuplicateCategoryName(_) => ErrorKind::Conflict,
            Error::SqlError(_) | Error::DatabaseLockError => ErrorKind::Storage,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<time::error::ComponentRange> for Error {
    fn from(value: time::error::ComponentRange) -> Self {
        Error::InvalidTimestamp(value.to_string())
    }
}

/// Returns true if `error` is a failed SQLite UNIQUE constraint.
pub(crate) fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        )
    )
}

/// Returns true if `error` is a failed SQLite FOREIGN KEY constraint.
pub(crate) fn is_foreign_key_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        )
    )
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn kinds_match_error_classes() {
        assert_eq!(Error::EmptyCategoryName.kind(), ErrorKind::Validation);
        assert_eq!(Error::InvalidAmount(f64::NAN).kind(), ErrorKind::Validation);
        assert_eq!(Error::AmountOverflow.kind(), ErrorKind::Validation);
        assert_eq!(
            Error::UnknownCategory("Rent".to_owned()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(Error::InvalidCategoryId(7).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::DuplicateCategoryName("Rent".to_owned()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(Error::DatabaseLockError.kind(), ErrorKind::Storage);
    }

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            Error::DuplicateCategoryName("Rent".to_owned()).to_string(),
            "the category \"Rent\" already exists"
        );
        assert_eq!(
            Error::InvalidCategoryId(42).to_string(),
            "the category ID 42 does not refer to a valid category"
        );
    }
}
