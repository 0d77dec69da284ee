//! The cash-flow sense of a transaction.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether money came in, went out, or is owed in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Money received.
    Income,
    /// Money spent.
    Expenditure,
    /// Money owed to you.
    Receivable,
    /// Money you owe.
    Payable,
}

impl Direction {
    /// All directions in declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::Income,
        Direction::Expenditure,
        Direction::Receivable,
        Direction::Payable,
    ];

    /// The label stored in the database and shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Income => "Income",
            Direction::Expenditure => "Expenditure",
            Direction::Receivable => "Receivable",
            Direction::Payable => "Payable",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        Direction::ALL
            .into_iter()
            .find(|direction| direction.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::InvalidDirection(s.to_owned()))
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::Error;

    use super::Direction;

    #[test]
    fn parses_labels_ignoring_case() {
        assert_eq!("Income".parse(), Ok(Direction::Income));
        assert_eq!("expenditure".parse(), Ok(Direction::Expenditure));
        assert_eq!(" RECEIVABLE ".parse(), Ok(Direction::Receivable));
        assert_eq!("Payable".parse(), Ok(Direction::Payable));
    }

    #[test]
    fn rejects_unknown_label() {
        let result: Result<Direction, Error> = "Gift".parse();

        assert_eq!(result, Err(Error::InvalidDirection("Gift".to_owned())));
    }

    #[test]
    fn display_matches_label() {
        for direction in Direction::ALL {
            assert_eq!(direction.to_string(), direction.as_str());
        }
    }

    #[test]
    fn round_trips_through_sqlite() {
        let connection = Connection::open_in_memory().unwrap();

        let got: Direction = connection
            .query_row("SELECT ?1", [Direction::Receivable], |row| row.get(0))
            .unwrap();

        assert_eq!(got, Direction::Receivable);
    }

    #[test]
    fn unknown_label_in_database_is_a_conversion_error() {
        let connection = Connection::open_in_memory().unwrap();

        let got = connection.query_row("SELECT 'Refund'", [], |row| row.get::<_, Direction>(0));

        assert!(got.is_err());
    }
}
