//! Aggregates transactions into monthly summaries and grand totals.
//!
//! All figures are fixed precision decimals rounded half-up to two places,
//! with rounding applied to each amount and again after every addition.

mod monthly;
mod rounding;
mod totals;

pub use monthly::{MonthSummary, MonthTotals, month_key, month_range, monthly_summary};
pub use rounding::{DECIMAL_PLACES, round_half_up, to_decimal};
pub use totals::totals_by_direction;
