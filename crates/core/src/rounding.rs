//! Stake rounding policies.
//!
//! Only the final stake of a computed leg is rounded. Intermediate returns and
//! conversions stay exact so rounding error never compounds along a pivot chain.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How a computed stake is rounded before it is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Keep full precision.
    Exact,
    /// Round to two decimal places.
    #[default]
    Cents,
    /// Round to the nearest multiple of a step (e.g. 1, 5 or 10 units).
    Nearest(Decimal),
}

impl Rounding {
    /// Rounds to the nearest whole unit.
    #[must_use]
    pub fn whole_units() -> Self {
        Self::Nearest(Decimal::ONE)
    }

    /// Applies the policy to an amount.
    ///
    /// Midpoints round away from zero. A non-positive step, or an amount too
    /// large to divide into steps, leaves the amount untouched.
    #[must_use]
    pub fn apply(self, amount: Decimal) -> Decimal {
        match self {
            Self::Exact => amount,
            Self::Cents => amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            Self::Nearest(step) if step > Decimal::ZERO => amount
                .checked_div(step)
                .map(|units| units.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
                .and_then(|units| units.checked_mul(step))
                .unwrap_or(amount),
            Self::Nearest(_) => amount,
        }
    }
}

impl std::fmt::Display for Rounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Cents => write!(f, "cents"),
            Self::Nearest(step) => write!(f, "nearest {step}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_is_identity() {
        assert_eq!(Rounding::Exact.apply(dec!(87.195121)), dec!(87.195121));
    }

    #[test]
    fn test_cents() {
        assert_eq!(Rounding::Cents.apply(dec!(87.195121)), dec!(87.20));
        assert_eq!(Rounding::Cents.apply(dec!(0.005)), dec!(0.01));
        assert_eq!(Rounding::Cents.apply(dec!(105)), dec!(105));
    }

    #[test]
    fn test_nearest_step() {
        assert_eq!(Rounding::whole_units().apply(dec!(104.5)), dec!(105));
        assert_eq!(Rounding::Nearest(dec!(5)).apply(dec!(102.4)), dec!(100));
        assert_eq!(Rounding::Nearest(dec!(5)).apply(dec!(102.5)), dec!(105));
        assert_eq!(Rounding::Nearest(dec!(10)).apply(dec!(87.2)), dec!(90));
    }

    #[test]
    fn test_non_positive_step_is_identity() {
        assert_eq!(Rounding::Nearest(Decimal::ZERO).apply(dec!(12.345)), dec!(12.345));
        assert_eq!(Rounding::Nearest(dec!(-5)).apply(dec!(12.345)), dec!(12.345));
    }

    #[test]
    fn test_nearest_step_too_small_for_amount_is_identity() {
        let huge = dec!(70000000000000000000000000000);
        assert_eq!(Rounding::Nearest(dec!(0.5)).apply(huge), huge);
    }

    #[test]
    fn test_default_is_cents() {
        assert_eq!(Rounding::default(), Rounding::Cents);
    }

    #[test]
    fn test_serde_forms() {
        let cents: Rounding = serde_json::from_str("\"cents\"").unwrap();
        assert_eq!(cents, Rounding::Cents);

        let nearest: Rounding = serde_json::from_str(r#"{"nearest": 5}"#).unwrap();
        assert_eq!(nearest, Rounding::Nearest(dec!(5)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Rounding::Nearest(dec!(10)).to_string(), "nearest 10");
        assert_eq!(Rounding::Exact.to_string(), "exact");
    }
}
