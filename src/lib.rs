//! A personal finance ledger backed by SQLite.
//!
//! The ledger stores transactions grouped into categories. Each transaction
//! has a direction: money coming in, going out, owed to you, or owed by you.
//! On top of the records sit a query engine for filtered, sorted retrieval and
//! an aggregation pipeline that builds monthly summaries with fixed precision
//! decimal rounding.
//!
//! Most callers want [Ledger], which owns the database connection and exposes
//! every operation. The free functions in [category], [transaction] and
//! [summary] take a `&Connection` directly.
//!
//! ```
//! use time::macros::datetime;
//!
//! use finance_ledger::{Direction, Ledger, Transaction};
//!
//! let ledger = Ledger::open_in_memory()?;
//! ledger.add_category("Salary", Direction::Income)?;
//! ledger.add_category("Rent", Direction::Expenditure)?;
//! ledger.add_transaction(
//!     "Salary",
//!     Transaction::build(5000.0).timestamp(datetime!(2025-10-01 09:00)),
//! )?;
//! ledger.add_transaction(
//!     "Rent",
//!     Transaction::build(1200.0).timestamp(datetime!(2025-10-01 10:00)),
//! )?;
//!
//! let october = &ledger.monthly_summary(2025)?["2025-10"];
//! assert_eq!(october.totals.remaining_amount.to_string(), "3800.00");
//! # Ok::<(), finance_ledger::Error>(())
//! ```

#![warn(missing_docs)]

pub mod category;
mod database_id;
mod db;
mod direction;
mod error;
mod ledger;
mod logging;
pub mod summary;
mod timestamp;
pub mod transaction;

pub use category::{Category, CategoryName};
pub use database_id::{CategoryId, DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use direction::Direction;
pub use error::{Error, ErrorKind};
pub use ledger::Ledger;
pub use logging::setup_logging;
pub use summary::{MonthSummary, MonthTotals};
pub use timestamp::{parse_timestamp, to_iso8601};
pub use transaction::{
    NewTransaction, SortField, Transaction, TransactionQuery, TransactionUpdate, TransactionView,
};
