use rust_decimal::{Decimal, RoundingStrategy};

use crate::Error;

/// The number of decimal places every summary figure is kept to.
pub const DECIMAL_PLACES: u32 = 2;

/// Convert a stored amount to a decimal via its shortest text form, so `0.1`
/// becomes exactly `0.1`.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `amount` is not finite or does not fit in
/// a [Decimal].
pub fn to_decimal(amount: f64) -> Result<Decimal, Error> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount(amount));
    }

    amount
        .to_string()
        .parse::<Decimal>()
        .map_err(|_| Error::InvalidAmount(amount))
}

/// Round to two decimal places with ties going away from zero, e.g. 0.125
/// becomes 0.13 and -0.125 becomes -0.13.
///
/// The result always carries exactly two decimal places.
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DECIMAL_PLACES);

    rounded
}

/// Add `amount` to `total`, rounding the amount and the new total.
///
/// # Errors
/// Returns [Error::AmountOverflow] if the sum does not fit in a [Decimal].
pub(super) fn accumulate(total: Decimal, amount: Decimal) -> Result<Decimal, Error> {
    total
        .checked_add(round_half_up(amount))
        .map(round_half_up)
        .ok_or(Error::AmountOverflow)
}

/// The rounded difference `minuend - subtrahend`.
///
/// # Errors
/// Returns [Error::AmountOverflow] if the difference does not fit in a [Decimal].
pub(super) fn difference(minuend: Decimal, subtrahend: Decimal) -> Result<Decimal, Error> {
    minuend
        .checked_sub(subtrahend)
        .map(round_half_up)
        .ok_or(Error::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::Error;

    use super::{accumulate, difference, round_half_up, to_decimal};

    #[test]
    fn converts_through_shortest_text() {
        assert_eq!(to_decimal(0.1), Ok(Decimal::new(1, 1)));
        assert_eq!(to_decimal(1200.0), Ok(Decimal::new(1200, 0)));
        assert_eq!(to_decimal(-42.75), Ok(Decimal::new(-4275, 2)));
    }

    #[test]
    fn rejects_non_finite_amounts() {
        assert_eq!(to_decimal(f64::INFINITY), Err(Error::InvalidAmount(f64::INFINITY)));
        assert!(matches!(to_decimal(f64::NAN), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn rejects_amounts_too_large_for_a_decimal() {
        assert_eq!(to_decimal(1e30), Err(Error::InvalidAmount(1e30)));
    }

    #[test]
    fn rounds_ties_away_from_zero() {
        assert_eq!(round_half_up(Decimal::new(125, 3)), Decimal::new(13, 2));
        assert_eq!(round_half_up(Decimal::new(-125, 3)), Decimal::new(-13, 2));
        assert_eq!(round_half_up(Decimal::new(124, 3)), Decimal::new(12, 2));
    }

    #[test]
    fn pads_to_two_places() {
        assert_eq!(round_half_up(Decimal::new(5000, 0)).to_string(), "5000.00");
    }

    #[test]
    fn rounds_every_step_of_a_sum() {
        let half_cent = Decimal::new(125, 3);

        let total = [half_cent, half_cent]
            .into_iter()
            .try_fold(Decimal::ZERO, accumulate);

        assert_eq!(total, Ok(Decimal::new(26, 2)));
    }

    #[test]
    fn sum_past_decimal_range_is_an_error() {
        let huge = to_decimal(5e28).unwrap();

        let total = accumulate(huge, huge);

        assert_eq!(total, Err(Error::AmountOverflow));
    }

    #[test]
    fn difference_past_decimal_range_is_an_error() {
        let huge = to_decimal(7e28).unwrap();

        assert_eq!(difference(huge, -huge), Err(Error::AmountOverflow));
        assert_eq!(difference(huge, huge), Ok(Decimal::ZERO));
    }
}
