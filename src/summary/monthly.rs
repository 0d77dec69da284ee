//! Per-month income and expenditure breakdowns.

use std::{collections::BTreeMap, ops::RangeInclusive};

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, Month, PrimitiveDateTime, Time};

use crate::{
    Error,
    direction::Direction,
    transaction::{SortField, TransactionQuery, TransactionView, query_transactions, to_views},
};

use super::rounding::{accumulate, difference, round_half_up, to_decimal};

/// The income, expenditure and net figures for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    /// The sum of all income in the month.
    #[serde(rename = "Total Income")]
    pub total_income: Decimal,
    /// The sum of all expenditure in the month.
    #[serde(rename = "Total Expenditure")]
    pub total_expenditure: Decimal,
    /// Income minus expenditure.
    #[serde(rename = "Remaining Amount")]
    pub remaining_amount: Decimal,
}

/// The summary of one month: totals plus per-category subtotals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    /// The month's totals.
    #[serde(rename = "Totals")]
    pub totals: MonthTotals,
    /// Income subtotals keyed by category name.
    #[serde(rename = "Income Categories")]
    pub income_categories: BTreeMap<String, Decimal>,
    /// Expenditure subtotals keyed by category name.
    #[serde(rename = "Expenditure Categories")]
    pub expenditure_categories: BTreeMap<String, Decimal>,
}

/// The first and last instants of `month` in `year`, both inclusive.
///
/// The range ends on the last calendar day at 23:59:59.999999.
///
/// # Errors
/// Returns [Error::InvalidYear] if the month cannot be represented.
pub fn month_range(year: i32, month: Month) -> Result<RangeInclusive<PrimitiveDateTime>, Error> {
    let invalid_year = |_| Error::InvalidYear(year);

    let first_day = Date::from_calendar_date(year, month, 1).map_err(invalid_year)?;
    let last_day = match month {
        Month::December => Date::from_calendar_date(year, Month::December, 31),
        _ => Date::from_calendar_date(year, month.next(), 1)
            .map(|first_of_next| first_of_next.previous_day().unwrap_or(first_of_next)),
    }
    .map_err(invalid_year)?;

    let end_of_day = Time::from_hms_micro(23, 59, 59, 999_999)?;

    Ok(PrimitiveDateTime::new(first_day, Time::MIDNIGHT)
        ..=PrimitiveDateTime::new(last_day, end_of_day))
}

/// The "YYYY-MM" key for a month.
pub fn month_key(year: i32, month: Month) -> String {
    format!("{year:04}-{:02}", month as u8)
}

/// Summarise every month of `year`, keyed by "YYYY-MM".
///
/// All twelve months are present. Each amount is rounded to two places and
/// every running total is rounded again after each addition. Receivable and
/// payable transactions are left out.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidYear] if `year` is outside 1 to 9999,
/// - [Error::AmountOverflow] if a total does not fit in a decimal,
/// - or [Error::SqlError] if there is an SQL error.
pub fn monthly_summary(
    year: i32,
    connection: &Connection,
) -> Result<BTreeMap<String, MonthSummary>, Error> {
    if !(1..=9999).contains(&year) {
        return Err(Error::InvalidYear(year));
    }

    let mut summaries = BTreeMap::new();
    let mut month = Month::January;

    loop {
        let range = month_range(year, month)?;
        let (total_income, income_categories) =
            summarise_direction(Direction::Income, &range, connection)?;
        let (total_expenditure, expenditure_categories) =
            summarise_direction(Direction::Expenditure, &range, connection)?;

        let summary = MonthSummary {
            totals: MonthTotals {
                total_income,
                total_expenditure,
                remaining_amount: difference(total_income, total_expenditure)?,
            },
            income_categories,
            expenditure_categories,
        };

        summaries.insert(month_key(year, month), summary);

        if month == Month::December {
            break;
        }
        month = month.next();
    }

    tracing::debug!("summarised {} months of {year}", summaries.len());

    Ok(summaries)
}

fn summarise_direction(
    direction: Direction,
    range: &RangeInclusive<PrimitiveDateTime>,
    connection: &Connection,
) -> Result<(Decimal, BTreeMap<String, Decimal>), Error> {
    let query = TransactionQuery {
        direction: Some(direction),
        start: Some(*range.start()),
        end: Some(*range.end()),
        sort_by: SortField::Timestamp,
        descending: false,
        ..Default::default()
    };
    let transactions = query_transactions(&query, connection)?;

    let mut total = round_half_up(Decimal::ZERO);
    let mut by_category = BTreeMap::new();

    for view in to_views(&transactions, connection)? {
        let amount = to_decimal(view.amount)?;
        total = accumulate(total, amount)?;

        let subtotal = by_category
            .entry(category_label(&view))
            .or_insert_with(|| round_half_up(Decimal::ZERO));
        *subtotal = accumulate(*subtotal, amount)?;
    }

    Ok((total, by_category))
}

fn category_label(view: &TransactionView) -> String {
    view.category
        .clone()
        .unwrap_or_else(|| format!("category {}", view.category_id))
}
