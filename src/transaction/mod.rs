//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` builder for creating transactions
//! - Database functions for storing, updating and deleting transactions
//! - The query engine for filtered, sorted retrieval
//! - Flat views of transactions for presentation

mod core;
mod query;
mod view;

pub use core::{
    NewTransaction, Transaction, TransactionUpdate, count_transactions, create_transaction,
    create_transaction_table, delete_transaction, get_all_transactions, get_transaction,
    map_transaction_row, update_transaction, validate_amount,
};
pub use query::{SortField, TransactionQuery, query_transactions};
pub use view::{TransactionView, to_views};
