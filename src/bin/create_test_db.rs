use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

use finance_ledger::{Direction, Ledger, Transaction, setup_logging};

/// A utility for creating a ledger database filled with sample data.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const CATEGORIES: [(&str, Direction); 9] = [
    ("Salary", Direction::Income),
    ("Rent", Direction::Expenditure),
    ("Food", Direction::Expenditure),
    ("Transport", Direction::Expenditure),
    ("Utilities", Direction::Expenditure),
    ("Entertainment", Direction::Expenditure),
    ("Groceries", Direction::Expenditure),
    ("Stocks", Direction::Expenditure),
    ("Dividends", Direction::Income),
];

/// Days of October 2025 (zero-based) on which shares are bought.
const TRADE_DAYS: [i64; 6] = [2, 6, 11, 15, 19, 24];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let ledger = Ledger::open(output_path)?;

    println!("Creating categories...");
    for (name, default_type) in CATEGORIES {
        ledger.add_category(name, default_type)?;
    }

    println!("Creating transactions for October 2025...");
    let count = create_october_transactions(&ledger)?;

    ledger.close()?;

    println!("Created {count} transactions. Success!");

    Ok(())
}

fn create_october_transactions(ledger: &Ledger) -> Result<usize, Box<dyn Error>> {
    let start = Date::from_calendar_date(2025, Month::October, 1)?;
    let at = |day: i64, hour: u8| -> Result<PrimitiveDateTime, Box<dyn Error>> {
        Ok(PrimitiveDateTime::new(
            start + Duration::days(day),
            Time::from_hms(hour, 0, 0)?,
        ))
    };

    let mut entries: Vec<(&str, SampleEntry)> = vec![
        ("Salary", (5000.0, Direction::Income, "October salary", at(0, 9)?)),
        ("Rent", (1200.0, Direction::Expenditure, "October rent", at(0, 10)?)),
        ("Utilities", (220.0, Direction::Expenditure, "Power and water", at(14, 12)?)),
        ("Dividends", (55.0, Direction::Income, "Quarterly dividend", at(20, 9)?)),
    ];

    for day in 0..30_i64 {
        // Up to two meals a day, varying by day.
        for meal in 0..(day % 3) {
            let amount = 5.0 + ((day * 7 + meal * 11) % 25) as f64 + 0.25 * (meal + 1) as f64;
            entries.push((
                "Food",
                (amount, Direction::Expenditure, "Lunch", at(day, 8 + (day % 12) as u8)?),
            ));
        }

        if day % 10 < 7 {
            let amount = 2.0 + ((day * 3) % 10) as f64 + 0.5;
            entries.push((
                "Transport",
                (amount, Direction::Expenditure, "Bus fare", at(day, 7 + (day % 15) as u8)?),
            ));
        }

        if day % 7 == 2 {
            let amount = 40.0 + ((day * 13) % 80) as f64 + 0.99;
            entries.push((
                "Groceries",
                (amount, Direction::Expenditure, "Weekly shop", at(day, 17)?),
            ));
        }

        if day % 9 == 4 {
            let amount = 20.0 + ((day * 17) % 60) as f64;
            entries.push((
                "Entertainment",
                (amount, Direction::Expenditure, "Movie night", at(day, 20)?),
            ));
        }
    }

    for (i, day) in TRADE_DAYS.into_iter().enumerate() {
        let buy_amount = 200.0 + (i as f64) * 175.5;
        let profit_rate = [-0.03, 0.05, 0.12, 0.0, 0.18, 0.07][i];
        let sell_amount = (buy_amount * (1.0 + profit_rate) * 100.0).round() / 100.0;
        let sell_day = (day + 1 + i as i64).min(30);

        entries.push((
            "Stocks",
            (buy_amount, Direction::Expenditure, "Buy shares", at(day, 11)?),
        ));
        entries.push((
            "Stocks",
            (sell_amount, Direction::Income, "Sell shares", at(sell_day, 15)?),
        ));
    }

    for (category, (amount, direction, note, timestamp)) in &entries {
        ledger.add_transaction(
            category,
            Transaction::build(*amount)
                .direction(*direction)
                .note(*note)
                .timestamp(*timestamp),
        )?;
    }

    Ok(entries.len())
}

/// The amount, direction, note and time of a sample transaction.
type SampleEntry = (f64, Direction, &'static str, PrimitiveDateTime);
