//! Filtered and sorted retrieval of transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::{
    Error,
    category::find_category_by_name,
    database_id::CategoryId,
    direction::Direction,
    timestamp::to_storage_text,
};

use super::core::{TRANSACTION_COLUMNS, Transaction, map_transaction_row};

/// The transaction attribute that decides the order of query results.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    /// When the transaction happened.
    #[default]
    Timestamp,
    /// The transaction amount.
    Amount,
    /// The transaction ID, i.e. the order transactions were stored in.
    Id,
    /// The ID of the transaction's category.
    CategoryId,
    /// The transaction's direction label.
    Direction,
}

impl SortField {
    /// All sort fields in declaration order.
    pub const ALL: [SortField; 5] = [
        SortField::Timestamp,
        SortField::Amount,
        SortField::Id,
        SortField::CategoryId,
        SortField::Direction,
    ];

    /// The label used to name the field in user input.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Timestamp => "timestamp",
            SortField::Amount => "amount",
            SortField::Id => "id",
            SortField::CategoryId => "category_id",
            SortField::Direction => "direction",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortField::Timestamp => "timestamp",
            SortField::Amount => "amount",
            SortField::Id => "id",
            SortField::CategoryId => "category_id",
            SortField::Direction => "actual_type",
        }
    }
}

impl Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();

        if label == "actual_type" {
            return Ok(SortField::Direction);
        }

        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == label)
            .ok_or_else(|| Error::InvalidSortField(s.to_owned()))
    }
}

/// Defines how transactions should be fetched by [query_transactions].
///
/// Every filter is optional and all given filters must hold. The default query
/// returns every transaction, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Only include transactions in the category with this name. A name that
    /// matches no category yields no transactions.
    pub category_name: Option<String>,
    /// Only include transactions with this direction.
    pub direction: Option<Direction>,
    /// Only include transactions with an amount of at least this much.
    pub min_amount: Option<f64>,
    /// Only include transactions with an amount of at most this much.
    pub max_amount: Option<f64>,
    /// Only include transactions at or after this time.
    pub start: Option<PrimitiveDateTime>,
    /// Only include transactions at or before this time.
    pub end: Option<PrimitiveDateTime>,
    /// Only include transactions whose note contains this text, ignoring case.
    pub note_keyword: Option<String>,
    /// The field to order results by. Ties are ordered by ID.
    pub sort_by: SortField,
    /// Whether to put the largest value first.
    pub descending: bool,
    /// Keep only the first N results. `None` or zero keeps everything.
    pub limit: Option<usize>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            category_id: None,
            category_name: None,
            direction: None,
            min_amount: None,
            max_amount: None,
            start: None,
            end: None,
            note_keyword: None,
            sort_by: SortField::Timestamp,
            descending: true,
            limit: None,
        }
    }
}

/// Query for transactions in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTimestamp] if a date bound cannot be formatted,
/// - or [Error::SqlError] if there is an SQL error.
pub fn query_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut where_clause_parts = vec![];
    let mut query_parameters = vec![];

    let mut add_filter = |column_condition: &str, value: Value| {
        query_parameters.push(value);
        where_clause_parts.push(format!("{column_condition} ?{}", query_parameters.len()));
    };

    if let Some(name) = non_empty(&query.category_name) {
        let name = name.trim();

        match find_category_by_name(name, connection)? {
            Some(category) => add_filter("category_id =", Value::Integer(category.id)),
            None => {
                tracing::debug!("no category named \"{name}\", query matches nothing");
                return Ok(Vec::new());
            }
        }
    }

    if let Some(category_id) = query.category_id {
        add_filter("category_id =", Value::Integer(category_id));
    }

    if let Some(direction) = query.direction {
        add_filter("actual_type =", Value::Text(direction.as_str().to_owned()));
    }

    if let Some(min_amount) = query.min_amount {
        add_filter("amount >=", Value::Real(min_amount));
    }

    if let Some(max_amount) = query.max_amount {
        add_filter("amount <=", Value::Real(max_amount));
    }

    if let Some(start) = query.start {
        add_filter("timestamp >=", Value::Text(to_storage_text(start)?));
    }

    if let Some(end) = query.end {
        add_filter("timestamp <=", Value::Text(to_storage_text(end)?));
    }

    let mut query_string_parts = vec![format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\""
    )];

    if !where_clause_parts.is_empty() {
        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
    }

    // Sort by the requested field, and then ID to keep the order of ties stable.
    query_string_parts.push(format!(
        "ORDER BY {} {}, id ASC",
        query.sort_by.column(),
        if query.descending { "DESC" } else { "ASC" }
    ));

    let query_string = query_string_parts.join(" ");
    tracing::debug!("querying transactions: {query_string}");

    let params = params_from_iter(query_parameters.iter());
    let transactions: Vec<Transaction> = connection
        .prepare(&query_string)?
        .query_map(params, map_transaction_row)?
        .collect::<Result<_, _>>()?;

    let keyword = non_empty(&query.note_keyword).map(str::to_lowercase);
    let limit = query.limit.filter(|&limit| limit > 0).unwrap_or(usize::MAX);

    Ok(transactions
        .into_iter()
        .filter(|transaction| match &keyword {
            Some(keyword) => transaction
                .note
                .as_ref()
                .is_some_and(|note| note.to_lowercase().contains(keyword.as_str())),
            None => true,
        })
        .take(limit)
        .collect())
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{PrimitiveDateTime, macros::datetime};

    use crate::{
        Error,
        category::{Category, CategoryName, create_category, delete_category},
        db::initialize,
        direction::Direction,
        transaction::{Transaction, create_transaction},
    };

    use super::{SortField, TransactionQuery, query_transactions};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn create_test_category(name: &str, default_type: Direction, conn: &Connection) -> Category {
        create_category(CategoryName::new_unchecked(name), default_type, conn)
            .expect("Could not create test category")
    }

    fn add(
        category: &Category,
        amount: f64,
        timestamp: PrimitiveDateTime,
        note: Option<&str>,
        conn: &Connection,
    ) -> Transaction {
        let mut builder = Transaction::build(amount).timestamp(timestamp);
        if let Some(note) = note {
            builder = builder.note(note);
        }

        create_transaction(category.id, builder, conn).expect("Could not create transaction")
    }

    fn ids(transactions: &[Transaction]) -> Vec<i64> {
        transactions.iter().map(|transaction| transaction.id).collect()
    }

    /// Salary and Food transactions spread over October 2025.
    fn seed(conn: &Connection) -> (Category, Category, Vec<Transaction>) {
        let salary = create_test_category("Salary", Direction::Income, conn);
        let food = create_test_category("Food", Direction::Expenditure, conn);

        let transactions = vec![
            add(&salary, 5000.0, datetime!(2025-10-01 09:00), Some("October pay"), conn),
            add(&food, 12.5, datetime!(2025-10-02 12:00), Some("Lunch at CAFÉ"), conn),
            add(&food, 30.0, datetime!(2025-10-10 19:00), None, conn),
            add(&food, 7.25, datetime!(2025-10-20 08:00), Some("coffee"), conn),
            add(&salary, 250.0, datetime!(2025-10-31 23:00), Some("Bonus"), conn),
        ];

        (salary, food, transactions)
    }

    #[test]
    fn sort_field_parses_labels() {
        assert_eq!("timestamp".parse(), Ok(SortField::Timestamp));
        assert_eq!("AMOUNT".parse(), Ok(SortField::Amount));
        assert_eq!("category_id".parse(), Ok(SortField::CategoryId));
        assert_eq!("actual_type".parse(), Ok(SortField::Direction));
        assert_eq!(
            "price".parse::<SortField>(),
            Err(Error::InvalidSortField("price".to_owned()))
        );
    }

    #[test]
    fn default_query_returns_everything_newest_first() {
        let conn = get_test_connection();
        let (_, _, transactions) = seed(&conn);

        let got = query_transactions(&TransactionQuery::default(), &conn).unwrap();

        let mut want = ids(&transactions);
        want.reverse();
        assert_eq!(ids(&got), want);
    }

    #[test]
    fn filters_by_category_id() {
        let conn = get_test_connection();
        let (_, food, _) = seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                category_id: Some(food.id),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 3);
        assert!(got.iter().all(|transaction| transaction.category_id == food.id));
    }

    #[test]
    fn filters_by_category_name() {
        let conn = get_test_connection();
        let (salary, _, _) = seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                category_name: Some("Salary".to_owned()),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|transaction| transaction.category_id == salary.id));
    }

    #[test]
    fn category_name_ignores_surrounding_whitespace() {
        let conn = get_test_connection();
        let (salary, _, _) = seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                category_name: Some("  Salary ".to_owned()),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|transaction| transaction.category_id == salary.id));
    }

    #[test]
    fn unknown_category_name_returns_empty() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                category_name: Some("Holidays".to_owned()),
                ..Default::default()
            },
            &conn,
        );

        assert_eq!(got, Ok(Vec::new()));
    }

    #[test]
    fn filters_by_direction() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                direction: Some(Direction::Income),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 2);
        assert!(
            got.iter()
                .all(|transaction| transaction.actual_type == Direction::Income)
        );
    }

    #[test]
    fn min_amount_excludes_smaller_amounts() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                min_amount: Some(12.5),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 4);
        assert!(got.iter().all(|transaction| transaction.amount >= 12.5));
    }

    #[test]
    fn amount_range_is_inclusive() {
        let conn = get_test_connection();
        let (_, _, transactions) = seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                min_amount: Some(12.5),
                max_amount: Some(250.0),
                sort_by: SortField::Id,
                descending: false,
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let want: Vec<i64> = transactions
            .iter()
            .filter(|transaction| (12.5..=250.0).contains(&transaction.amount))
            .map(|transaction| transaction.id)
            .collect();
        assert_eq!(ids(&got), want);
        assert_eq!(want.len(), 3);
    }

    #[test]
    fn date_range_is_inclusive() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                start: Some(datetime!(2025-10-02 12:00)),
                end: Some(datetime!(2025-10-20 08:00)),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let amounts: Vec<f64> = got.iter().map(|transaction| transaction.amount).collect();
        assert_eq!(amounts, vec![7.25, 30.0, 12.5]);
    }

    #[test]
    fn note_keyword_ignores_case() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                note_keyword: Some("café".to_owned()),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].note.as_deref(), Some("Lunch at CAFÉ"));
    }

    #[test]
    fn note_keyword_treats_wildcards_literally() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                note_keyword: Some("%".to_owned()),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn combines_filters_with_and() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                category_name: Some("Food".to_owned()),
                direction: Some(Direction::Expenditure),
                max_amount: Some(20.0),
                start: Some(datetime!(2025-10-15 00:00)),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].amount, 7.25);
    }

    #[test]
    fn sorting_by_amount_reverses_when_descending() {
        let conn = get_test_connection();
        seed(&conn);

        let ascending = query_transactions(
            &TransactionQuery {
                sort_by: SortField::Amount,
                descending: false,
                ..Default::default()
            },
            &conn,
        )
        .unwrap();
        let descending = query_transactions(
            &TransactionQuery {
                sort_by: SortField::Amount,
                descending: true,
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let mut reversed = ids(&descending);
        reversed.reverse();
        assert_eq!(ids(&ascending), reversed);
        let amounts: Vec<f64> = ascending.iter().map(|transaction| transaction.amount).collect();
        assert_eq!(amounts, vec![7.25, 12.5, 30.0, 250.0, 5000.0]);
    }

    #[test]
    fn ties_are_ordered_by_id() {
        let conn = get_test_connection();
        let (salary, food, _) = seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                sort_by: SortField::CategoryId,
                descending: false,
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let category_ids: Vec<i64> = got.iter().map(|transaction| transaction.category_id).collect();
        assert_eq!(
            category_ids,
            vec![salary.id, salary.id, food.id, food.id, food.id]
        );
        assert!(got[0].id < got[1].id);
        assert!(got[2].id < got[3].id && got[3].id < got[4].id);
    }

    #[test]
    fn sorts_by_direction_label() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                sort_by: SortField::Direction,
                descending: false,
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let directions: Vec<Direction> = got.iter().map(|transaction| transaction.actual_type).collect();
        assert_eq!(
            directions,
            vec![
                Direction::Expenditure,
                Direction::Expenditure,
                Direction::Expenditure,
                Direction::Income,
                Direction::Income,
            ]
        );
    }

    #[test]
    fn limit_keeps_first_results() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                sort_by: SortField::Amount,
                limit: Some(2),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        let amounts: Vec<f64> = got.iter().map(|transaction| transaction.amount).collect();
        assert_eq!(amounts, vec![5000.0, 250.0]);
    }

    #[test]
    fn zero_limit_keeps_everything() {
        let conn = get_test_connection();
        seed(&conn);

        let got = query_transactions(
            &TransactionQuery {
                limit: Some(0),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 5);
    }

    #[test]
    fn deleted_category_leaves_no_transactions() {
        let conn = get_test_connection();
        let (_, food, _) = seed(&conn);

        delete_category(food.id, &conn).unwrap();

        let got = query_transactions(&TransactionQuery::default(), &conn).unwrap();
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|transaction| transaction.category_id != food.id));
    }
}
