use std::collections::BTreeMap;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{Error, direction::Direction, transaction::get_all_transactions};

use super::rounding::{accumulate, to_decimal};

/// The rounded total of every stored transaction, per direction.
///
/// Directions with no transactions are left out.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if a stored amount cannot be converted to a decimal,
/// - [Error::AmountOverflow] if a total does not fit in a decimal,
/// - or [Error::SqlError] if there is an SQL error.
pub fn totals_by_direction(connection: &Connection) -> Result<BTreeMap<Direction, Decimal>, Error> {
    let mut totals = BTreeMap::new();

    for transaction in get_all_transactions(connection)? {
        let amount = to_decimal(transaction.amount)?;
        let total = totals
            .entry(transaction.actual_type)
            .or_insert(Decimal::ZERO);
        *total = accumulate(*total, amount)?;
    }

    tracing::debug!("totalled {} directions", totals.len());

    Ok(totals)
}
