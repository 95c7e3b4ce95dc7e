//! Fixed-point storage for quantities and money.
//!
//! The engine computes with [`Decimal`] and persists every quantity and
//! monetary value as a signed integer of **micro units** (six fractional
//! digits). Columns holding these values carry the `_minor` suffix.
//!
//! Values entered by callers must fit the storage scale exactly; values the
//! engine derives (usage, costs, conversions) are rounded half away from zero
//! before they are written, and the rounded value is the one used for every
//! decision in the same unit of work.
//!
//! ```rust
//! use engine::numeric::{from_minor, to_minor};
//! use rust_decimal::Decimal;
//!
//! let minor = to_minor(Decimal::new(2_5, 1)).unwrap();
//! assert_eq!(minor, 2_500_000);
//! assert_eq!(from_minor(minor), Decimal::new(25, 1));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{EngineError, ResultEngine};

/// Number of fractional digits kept in storage.
pub const SCALE: u32 = 6;

/// Round a derived value to the storage scale.
#[must_use]
pub fn round(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Convert a decimal into micro units, rounding to the storage scale.
pub fn to_minor(value: Decimal) -> ResultEngine<i64> {
    let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SCALE);
    if rounded.scale() != SCALE {
        return Err(EngineError::Validation(format!("value {value} is too large")));
    }
    i64::try_from(rounded.mantissa())
        .map_err(|_| EngineError::Validation(format!("value {value} is too large")))
}

/// Convert stored micro units back into a decimal.
#[must_use]
pub fn from_minor(minor: i64) -> Decimal {
    Decimal::new(minor, SCALE).normalize()
}

/// Reject caller-provided values that would lose digits in storage or do
/// not fit a `_minor` column.
pub(crate) fn ensure_scale(value: Decimal, label: &str) -> ResultEngine<Decimal> {
    let normalized = value.normalize();
    if normalized.scale() > SCALE {
        return Err(EngineError::Validation(format!(
            "{label} supports at most {SCALE} decimal places"
        )));
    }
    to_minor(normalized).map_err(|_| EngineError::Validation(format!("{label} is too large")))?;
    Ok(normalized)
}

/// Checked product. Overflow is a `Validation` error, never a panic.
pub fn mul(a: Decimal, b: Decimal) -> ResultEngine<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| EngineError::Validation(format!("{a} x {b} is out of range")))
}

/// Checked quotient. `b` must be non-zero.
pub fn div(a: Decimal, b: Decimal) -> ResultEngine<Decimal> {
    a.checked_div(b)
        .ok_or_else(|| EngineError::Validation(format!("{a} / {b} is out of range")))
}

/// Checked sum.
pub fn add(a: Decimal, b: Decimal) -> ResultEngine<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| EngineError::Validation(format!("{a} + {b} is out of range")))
}

/// Caller-provided value that must be strictly positive.
pub(crate) fn require_positive(value: Decimal, label: &str) -> ResultEngine<Decimal> {
    let value = ensure_scale(value, label)?;
    if value <= Decimal::ZERO {
        return Err(EngineError::Validation(format!("{label} must be > 0")));
    }
    Ok(value)
}

/// Caller-provided value that must not be negative.
pub(crate) fn require_non_negative(value: Decimal, label: &str) -> ResultEngine<Decimal> {
    let value = ensure_scale(value, label)?;
    if value < Decimal::ZERO {
        return Err(EngineError::Validation(format!("{label} must be >= 0")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn minor_units_keep_six_digits() {
        assert_eq!(to_minor(dec("1")).unwrap(), 1_000_000);
        assert_eq!(to_minor(dec("0.000001")).unwrap(), 1);
        assert_eq!(to_minor(dec("-12.5")).unwrap(), -12_500_000);
        assert_eq!(from_minor(80_000_000), dec("80"));
        assert_eq!(from_minor(1), dec("0.000001"));
    }

    #[test]
    fn derived_values_round_half_away_from_zero() {
        assert_eq!(to_minor(dec("0.0000005")).unwrap(), 1);
        assert_eq!(to_minor(dec("-0.0000005")).unwrap(), -1);
        assert_eq!(round(dec("1.23456749")), dec("1.234567"));
        assert_eq!(round(dec("1") / dec("3")), dec("0.333333"));
    }

    #[test]
    fn caller_values_reject_extra_digits() {
        assert!(ensure_scale(dec("0.1234567"), "quantity").is_err());
        assert_eq!(ensure_scale(dec("2.500000"), "quantity").unwrap(), dec("2.5"));
        assert!(require_positive(Decimal::ZERO, "quantity").is_err());
        assert!(require_non_negative(dec("-1"), "quantity").is_err());
        assert_eq!(require_non_negative(Decimal::ZERO, "quantity").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn overflow_is_a_validation_error() {
        assert!(to_minor(Decimal::MAX).is_err());
        assert!(matches!(
            ensure_scale(Decimal::MAX, "unit_price"),
            Err(EngineError::Validation(_))
        ));
        assert!(require_positive(dec("10000000000000"), "quantity").is_err());
        assert_eq!(
            require_positive(dec("9000000000000"), "quantity").unwrap(),
            dec("9000000000000")
        );
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        assert_eq!(mul(dec("2.5"), dec("4")).unwrap(), dec("10"));
        assert!(matches!(mul(Decimal::MAX, dec("2")), Err(EngineError::Validation(_))));
        assert!(add(Decimal::MAX, Decimal::ONE).is_err());
        assert!(div(Decimal::ONE, Decimal::ZERO).is_err());
        assert_eq!(div(dec("2.5"), dec("0.001")).unwrap(), dec("2500"));
    }
}
