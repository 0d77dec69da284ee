//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    category::{Category, CategoryName},
    database_id::CategoryId,
    direction::Direction,
    error::is_unique_violation,
};

/// Create a category and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategoryName] if another category already uses `name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    default_type: Direction,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, default_type) VALUES (?1, ?2);",
            (name.as_ref(), default_type),
        )
        .map_err(|error| map_write_error(error, &name))?;

    let id = connection.last_insert_rowid();

    tracing::info!("created category {id} \"{name}\" ({default_type})");

    Ok(Category {
        id,
        name,
        default_type,
    })
}

/// Retrieve a single category by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `category_id` does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, default_type FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve the category called `name`, if there is one.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn find_category_by_name(
    name: &str,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare("SELECT id, name, default_type FROM category WHERE name = :name;")?
        .query_row(&[(":name", &name)], map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, default_type FROM category ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Change a category's name and/or default direction.
///
/// Both changes are applied in one SQL transaction: either both persist or
/// neither does. Existing transactions keep the direction they were created
/// with.
///
/// Returns `Ok(None)` if `category_id` does not refer to a category.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategoryName] if a different category already uses `new_name`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    category_id: CategoryId,
    new_name: Option<CategoryName>,
    new_default_type: Option<Direction>,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    // Using unchecked_transaction because callers may only have &Connection from a MutexGuard.
    let transaction = connection.unchecked_transaction()?;

    let current = match get_category(category_id, &transaction) {
        Ok(category) => category,
        Err(Error::NotFound) => return Ok(None),
        Err(error) => return Err(error),
    };

    if let Some(ref name) = new_name {
        let is_taken: bool = transaction.query_row(
            "SELECT EXISTS (SELECT 1 FROM category WHERE name = ?1 AND id != ?2);",
            (name.as_ref(), category_id),
            |row| row.get(0),
        )?;

        if is_taken {
            return Err(Error::DuplicateCategoryName(name.to_string()));
        }
    }

    let name = new_name.unwrap_or(current.name);
    let default_type = new_default_type.unwrap_or(current.default_type);

    transaction
        .execute(
            "UPDATE category SET name = ?1, default_type = ?2 WHERE id = ?3;",
            (name.as_ref(), default_type, category_id),
        )
        .map_err(|error| map_write_error(error, &name))?;

    transaction.commit()?;

    tracing::info!("updated category {category_id} to \"{name}\" ({default_type})");

    Ok(Some(Category {
        id: category_id,
        name,
        default_type,
    }))
}

/// Delete a category and every transaction that belongs to it.
///
/// Returns whether the category existed.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error,
/// in which case nothing is deleted.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<bool, Error> {
    let transaction = connection.unchecked_transaction()?;

    let deleted_transactions = transaction.execute(
        "DELETE FROM \"transaction\" WHERE category_id = ?1",
        [category_id],
    )?;
    let rows_affected = transaction.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    transaction.commit()?;

    if rows_affected == 0 {
        return Ok(false);
    }

    tracing::info!(
        "deleted category {category_id} and {deleted_transactions} of its transactions"
    );

    Ok(true)
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            default_type TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn map_write_error(error: rusqlite::Error, name: &CategoryName) -> Error {
    if is_unique_violation(&error) {
        Error::DuplicateCategoryName(name.to_string())
    } else {
        error.into()
    }
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let default_type = row.get(2)?;

    Ok(Category {
        id,
        name,
        default_type,
    })
}
