//! Error types shared by the surebet crates.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::currency::Currency;

/// Errors raised by strict rate lookups.
///
/// The lenient conversion path never returns these; it substitutes a rate of
/// one and reports a [`crate::currency::MissingRateWarning`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    /// No rate exists for the currency.
    #[error("No BRL rate configured for {currency}")]
    Missing {
        /// Currency that was looked up.
        currency: Currency,
    },

    /// The configured rate is zero or negative.
    #[error("BRL rate for {currency} must be positive, got {rate}")]
    NonPositive {
        /// Currency that was looked up.
        currency: Currency,
        /// Offending rate.
        rate: Decimal,
    },

    /// The converted amount does not fit in a `Decimal`.
    #[error("Converting {from} to {to} overflows")]
    Overflow {
        /// Source currency.
        from: Currency,
        /// Target currency.
        to: Currency,
    },
}

/// Errors raised when parsing a currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// The code was empty after trimming.
    #[error("Currency code must not be empty")]
    Empty,

    /// The code contained characters other than ASCII letters and digits.
    #[error("Invalid currency code: {0}")]
    Invalid(String),
}
