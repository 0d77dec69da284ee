//! Categories group transactions and give them a default direction.

mod db;
mod domain;

pub use db::{
    create_category, create_category_table, delete_category, find_category_by_name,
    get_all_categories, get_category, update_category,
};
pub use domain::{Category, CategoryName};
