//! Flat, display-ready records for presenting transactions.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    Error,
    category::get_all_categories,
    database_id::{CategoryId, TransactionId},
    timestamp::to_iso8601,
};

use super::core::Transaction;

/// A transaction with its category name resolved and every field rendered for
/// display.
///
/// Serializes to a flat JSON object; a missing note or an unresolved category
/// becomes `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the transaction's category.
    pub category_id: CategoryId,
    /// The category's name, `None` if the category could not be found.
    pub category: Option<String>,
    /// The direction label, e.g. "Income".
    pub actual_type: String,
    /// The amount of money involved.
    pub amount: f64,
    /// The free text note, if any.
    pub note: Option<String>,
    /// ISO-8601 date-time, e.g. "2025-10-01T09:00:00".
    pub timestamp: String,
}

impl TransactionView {
    /// Render `transaction` with the resolved `category_name`.
    pub fn new(transaction: &Transaction, category_name: Option<&str>) -> Self {
        Self {
            id: transaction.id,
            category_id: transaction.category_id,
            category: category_name.map(str::to_owned),
            actual_type: transaction.actual_type.to_string(),
            amount: transaction.amount,
            note: transaction.note.clone(),
            timestamp: to_iso8601(transaction.timestamp),
        }
    }

    /// The view as a field name to value mapping.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();

        fields.insert("id".to_owned(), Value::from(self.id));
        fields.insert("category_id".to_owned(), Value::from(self.category_id));
        fields.insert("category".to_owned(), Value::from(self.category));
        fields.insert("actual_type".to_owned(), Value::from(self.actual_type));
        fields.insert("amount".to_owned(), Value::from(self.amount));
        fields.insert("note".to_owned(), Value::from(self.note));
        fields.insert("timestamp".to_owned(), Value::from(self.timestamp));

        fields
    }
}

/// Render `transactions` as views, resolving category names with one lookup.
///
/// # Errors
/// This function will return an [Error::SqlError] if the categories cannot be
/// loaded.
pub fn to_views(
    transactions: &[Transaction],
    connection: &Connection,
) -> Result<Vec<TransactionView>, Error> {
    let category_names: HashMap<CategoryId, String> = get_all_categories(connection)?
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    Ok(transactions
        .iter()
        .map(|transaction| {
            TransactionView::new(
                transaction,
                category_names
                    .get(&transaction.category_id)
                    .map(String::as_str),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::macros::datetime;

    use crate::{
        category::{CategoryName, create_category},
        db::initialize,
        direction::Direction,
        transaction::{Transaction, create_transaction},
    };

    use super::{TransactionView, to_views};

    fn test_transaction() -> Transaction {
        Transaction {
            id: 3,
            category_id: 1,
            actual_type: Direction::Expenditure,
            amount: 12.5,
            note: None,
            timestamp: datetime!(2025-10-02 12:00),
        }
    }

    #[test]
    fn serializes_to_flat_object_with_nulls() {
        let view = TransactionView::new(&test_transaction(), Some("Food"));

        let got = serde_json::to_value(&view).unwrap();

        assert_eq!(
            got,
            json!({
                "id": 3,
                "category_id": 1,
                "category": "Food",
                "actual_type": "Expenditure",
                "amount": 12.5,
                "note": null,
                "timestamp": "2025-10-02T12:00:00",
            })
        );
    }

    #[test]
    fn into_fields_matches_serialized_form() {
        let view = TransactionView::new(&test_transaction(), None);
        let serialized = serde_json::to_value(&view).unwrap();

        let fields = view.into_fields();

        assert_eq!(Value::Object(fields), serialized);
    }

    #[test]
    fn unresolved_category_is_null() {
        let view = TransactionView::new(&test_transaction(), None);

        assert_eq!(view.category, None);
        assert_eq!(view.into_fields()["category"], Value::Null);
    }

    #[test]
    fn to_views_resolves_category_names() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let rent = create_category(
            CategoryName::new_unchecked("Rent"),
            Direction::Expenditure,
            &connection,
        )
        .unwrap();
        let transaction = create_transaction(
            rent.id,
            Transaction::build(1200.0)
                .note("October")
                .timestamp(datetime!(2025-10-01 10:00)),
            &connection,
        )
        .unwrap();

        let views = to_views(&[transaction.clone()], &connection).unwrap();

        assert_eq!(
            views,
            vec![TransactionView {
                id: transaction.id,
                category_id: rent.id,
                category: Some("Rent".to_owned()),
                actual_type: "Expenditure".to_owned(),
                amount: 1200.0,
                note: Some("October".to_owned()),
                timestamp: "2025-10-01T10:00:00".to_owned(),
            }]
        );
    }
}
