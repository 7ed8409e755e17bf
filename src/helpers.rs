//! Shared numeric helpers built on `rust_decimal`.
//!
//! Weather values are rounded in decimal space so that a reading such as
//! `0.125 mm` becomes `0.13 mm` rather than whatever the nearest binary float
//! happens to round to. Coordinates become `Decimal` cache keys so that two
//! requests for the same 4-decimal location hash identically.
//!
//! All helpers treat non-finite input (NaN, ±Inf) as zero.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Round an f64 to `dp` decimal places (half away from zero).
pub(crate) fn round_dp(v: f64, dp: u32) -> f64 {
    to_decimal_dp(v, dp).to_f64().unwrap_or(0.0)
}

/// Convert an f64 to a Decimal rounded to `dp` decimal places.
pub(crate) fn to_decimal_dp(v: f64, dp: u32) -> Decimal {
    if !v.is_finite() {
        tracing::warn!("to_decimal_dp received non-finite value {}, defaulting to 0", v);
        return Decimal::ZERO;
    }
    Decimal::from_f64(v)
        .unwrap_or_default()
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a comfort average to an integer score in `0..=100`.
///
/// Ties go to the even neighbour (82.5 → 82, 83.5 → 84).
pub(crate) fn round_score(v: f64) -> u8 {
    if !v.is_finite() {
        return 0;
    }
    Decimal::from_f64(v)
        .unwrap_or_default()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_u8()
        .unwrap_or(if v > 0.0 { 100 } else { 0 })
        .min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_dp_one_decimal() {
        assert_eq!(round_dp(12.34, 1), 12.3);
        assert_eq!(round_dp(-4.75, 1), -4.8);
    }

    #[test]
    fn test_round_dp_two_decimals() {
        assert_eq!(round_dp(0.125, 2), 0.13);
        assert_eq!(round_dp(2.5, 2), 2.5);
    }

    #[test]
    fn test_round_dp_nan() {
        assert_eq!(round_dp(f64::NAN, 1), 0.0);
    }

    #[test]
    fn test_to_decimal_dp_coordinate() {
        let d = to_decimal_dp(54.372158, 4);
        assert_eq!(d, Decimal::from_str("54.3722").unwrap());
    }

    #[test]
    fn test_to_decimal_dp_infinity() {
        assert_eq!(to_decimal_dp(f64::INFINITY, 4), Decimal::ZERO);
    }

    #[test]
    fn test_round_score_ties_to_even() {
        assert_eq!(round_score(82.5), 82);
        assert_eq!(round_score(83.5), 84);
        assert_eq!(round_score(66.666), 67);
    }

    #[test]
    fn test_round_score_bounds() {
        assert_eq!(round_score(0.0), 0);
        assert_eq!(round_score(100.0), 100);
        assert_eq!(round_score(f64::NAN), 0);
    }
}
