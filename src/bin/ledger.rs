use std::error::Error;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use time::PrimitiveDateTime;

use finance_ledger::{
    CategoryId, Direction, Ledger, SortField, Transaction, TransactionId, TransactionQuery,
    TransactionUpdate, parse_timestamp, setup_logging,
};

/// Record, query and summarise personal finances.
///
/// Results are printed to stdout as JSON.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File path to the ledger's SQLite database.
    #[arg(long, env = "LEDGER_DB_PATH", default_value = "ledger.db")]
    db_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage categories.
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Record a transaction.
    Add {
        /// The name of the category to file the transaction under.
        category: String,

        /// The amount of money involved.
        #[arg(allow_negative_numbers = true)]
        amount: f64,

        /// Override the category's default direction.
        #[arg(long = "type")]
        direction: Option<Direction>,

        /// A free text note.
        #[arg(long)]
        note: Option<String>,

        /// When the transaction happened, e.g. "2025-10-01T09:00". Defaults to now.
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<PrimitiveDateTime>,
    },

    /// Show a single transaction.
    Get {
        /// The transaction ID.
        id: TransactionId,
    },

    /// Change fields of a transaction.
    Update {
        /// The transaction ID.
        id: TransactionId,

        /// Move the transaction to the category with this name.
        #[arg(long)]
        category: Option<String>,

        /// The new direction.
        #[arg(long = "type")]
        direction: Option<Direction>,

        /// The new amount.
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<f64>,

        /// The new note.
        #[arg(long)]
        note: Option<String>,

        /// The new timestamp.
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<PrimitiveDateTime>,
    },

    /// Delete a transaction.
    Delete {
        /// The transaction ID.
        id: TransactionId,
    },

    /// List transactions matching the given filters.
    Query(QueryArgs),

    /// Summarise income and expenditure for each month of a year.
    Summary {
        /// The year to summarise.
        #[arg(long)]
        year: i32,
    },

    /// Show the total of all transactions for each direction.
    Totals,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Create a category.
    Add {
        /// The category's name.
        name: String,

        /// The direction given to transactions in this category.
        #[arg(long = "type")]
        default_type: Direction,
    },

    /// List all categories.
    List,

    /// Rename a category or change its default direction.
    Update {
        /// The category ID.
        id: CategoryId,

        /// The new name.
        #[arg(long)]
        name: Option<String>,

        /// The new default direction.
        #[arg(long = "type")]
        default_type: Option<Direction>,
    },

    /// Delete a category and all of its transactions.
    Delete {
        /// The category's name.
        name: String,
    },
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Only show transactions in this category.
    #[arg(long)]
    category: Option<String>,

    /// Only show transactions in the category with this ID.
    #[arg(long)]
    category_id: Option<CategoryId>,

    /// Only show transactions with this direction.
    #[arg(long = "type")]
    direction: Option<Direction>,

    /// Only show transactions of at least this amount.
    #[arg(long, allow_negative_numbers = true)]
    min_amount: Option<f64>,

    /// Only show transactions of at most this amount.
    #[arg(long, allow_negative_numbers = true)]
    max_amount: Option<f64>,

    /// Only show transactions at or after this time.
    #[arg(long, value_parser = parse_timestamp)]
    from: Option<PrimitiveDateTime>,

    /// Only show transactions at or before this time.
    #[arg(long, value_parser = parse_timestamp)]
    to: Option<PrimitiveDateTime>,

    /// Only show transactions whose note contains this text, ignoring case.
    #[arg(long)]
    keyword: Option<String>,

    /// The field to sort by: timestamp, amount, id, category_id or direction.
    #[arg(long, default_value_t = SortField::Timestamp)]
    sort_by: SortField,

    /// Sort smallest first instead of largest first.
    #[arg(long)]
    ascending: bool,

    /// Show at most this many transactions.
    #[arg(long)]
    limit: Option<usize>,
}

impl From<QueryArgs> for TransactionQuery {
    fn from(args: QueryArgs) -> Self {
        TransactionQuery {
            category_id: args.category_id,
            category_name: args.category,
            direction: args.direction,
            min_amount: args.min_amount,
            max_amount: args.max_amount,
            start: args.from,
            end: args.to,
            note_keyword: args.keyword,
            sort_by: args.sort_by,
            descending: !args.ascending,
            limit: args.limit,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let cli = Cli::parse();
    let ledger = Ledger::open(&cli.db_path)?;

    run(cli.command, &ledger)?;

    ledger.close()?;

    Ok(())
}

fn run(command: Command, ledger: &Ledger) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Category(command) => run_category(command, ledger),
        Command::Add {
            category,
            amount,
            direction,
            note,
            at,
        } => {
            let mut new_transaction = Transaction::build(amount);
            new_transaction.actual_type = direction;
            new_transaction.note = note;
            new_transaction.timestamp = at;

            let created = ledger.add_transaction(&category, new_transaction)?;
            print_json(&ledger.view_transaction(&created)?)
        }
        Command::Get { id } => match ledger.get_transaction(id)? {
            Some(transaction) => print_json(&ledger.view_transaction(&transaction)?),
            None => Err(format!("no transaction with ID {id}").into()),
        },
        Command::Update {
            id,
            category,
            direction,
            amount,
            note,
            at,
        } => {
            let category_id = match category {
                Some(name) => Some(
                    ledger
                        .find_category(&name)?
                        .ok_or(finance_ledger::Error::UnknownCategory(name))?
                        .id,
                ),
                None => None,
            };
            let update = TransactionUpdate {
                category_id,
                actual_type: direction,
                amount,
                note,
                timestamp: at,
            };

            match ledger.update_transaction(id, update)? {
                Some(transaction) => print_json(&ledger.view_transaction(&transaction)?),
                None => Err(format!("no transaction with ID {id}").into()),
            }
        }
        Command::Delete { id } => {
            let deleted = ledger.delete_transaction(id)?;
            print_json(&json!({ "id": id, "deleted": deleted }))
        }
        Command::Query(args) => {
            let views = ledger.query_transactions(&args.into())?;
            print_json(&views)
        }
        Command::Summary { year } => print_json(&ledger.monthly_summary(year)?),
        Command::Totals => print_json(&ledger.totals_by_direction()?),
    }
}

fn run_category(command: CategoryCommand, ledger: &Ledger) -> Result<(), Box<dyn Error>> {
    match command {
        CategoryCommand::Add { name, default_type } => {
            print_json(&ledger.add_category(&name, default_type)?)
        }
        CategoryCommand::List => print_json(&ledger.list_categories()?),
        CategoryCommand::Update {
            id,
            name,
            default_type,
        } => match ledger.update_category(id, name.as_deref(), default_type)? {
            Some(category) => print_json(&category),
            None => Err(format!("no category with ID {id}").into()),
        },
        CategoryCommand::Delete { name } => {
            let deleted = ledger.delete_category(&name)?;
            print_json(&json!({ "name": name, "deleted": deleted }))
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}
