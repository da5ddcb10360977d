//! Currency codes, the BRL pivot rate table and the conversion primitive.
//!
//! Every conversion routes through BRL: a table entry says how many BRL one
//! unit of a currency is worth, so converting `A -> B` is
//! `amount × rate(A) / rate(B)`. One table covers every pair.
//!
//! ```text
//! rates: USD = 5.50, EUR = 6.00
//!
//! 195 USD -> BRL:  195 × 5.50        = 1072.50
//! 195 USD -> EUR:  195 × 5.50 / 6.00 =  178.75
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::arith::{checked_scale, saturated};
use crate::error::{CurrencyError, RateError};

// =============================================================================
// Currency
// =============================================================================

/// Stablecoins priced as US dollars.
pub const USD_STABLECOINS: &[&str] = &["USDT", "USDC", "BUSD", "DAI", "TUSD", "USDP"];

/// An upper-cased currency code.
///
/// Codes are normalized on construction, so comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Pivot currency code.
    pub const PIVOT_CODE: &'static str = "BRL";

    /// Parses and normalizes a currency code.
    ///
    /// # Errors
    /// Returns an error if the code is empty or holds non-alphanumeric characters.
    pub fn new(code: impl AsRef<str>) -> Result<Self, CurrencyError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(CurrencyError::Empty);
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CurrencyError::Invalid(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// The pivot currency (BRL).
    #[must_use]
    pub fn brl() -> Self {
        Self(Self::PIVOT_CODE.to_string())
    }

    /// US dollar.
    #[must_use]
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Euro.
    #[must_use]
    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    /// Pound sterling.
    #[must_use]
    pub fn gbp() -> Self {
        Self("GBP".to_string())
    }

    /// Returns the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the pivot currency.
    #[must_use]
    pub fn is_pivot(&self) -> bool {
        self.0 == Self::PIVOT_CODE
    }

    /// Returns true for a dollar-pegged stablecoin.
    #[must_use]
    pub fn is_usd_stablecoin(&self) -> bool {
        USD_STABLECOINS.contains(&self.0.as_str())
    }

    /// Returns the code used for rate lookups.
    ///
    /// Stablecoins share the USD rate.
    #[must_use]
    pub fn rate_key(&self) -> Currency {
        if self.is_usd_stablecoin() {
            Self::usd()
        } else {
            self.clone()
        }
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

// =============================================================================
// Rate Table
// =============================================================================

/// Outcome of looking a currency up in a [`BrlRates`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLookup {
    /// The currency is BRL itself.
    Pivot,
    /// A positive rate was found.
    Found(Decimal),
    /// No entry exists.
    Missing,
    /// An entry exists but is zero or negative.
    NonPositive(Decimal),
}

/// Mapping from currency to "BRL per one unit of this currency".
///
/// BRL is implicit and always resolves to one, whatever the table holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrlRates(BTreeMap<Currency, Decimal>);

impl BrlRates {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a rate.
    #[must_use]
    pub fn with_rate(mut self, currency: Currency, rate: Decimal) -> Self {
        self.insert(currency, rate);
        self
    }

    /// Adds or replaces a rate in place.
    pub fn insert(&mut self, currency: Currency, rate: Decimal) {
        self.0.insert(currency, rate);
    }

    /// Returns the raw entry for a currency, without stablecoin aliasing.
    #[must_use]
    pub fn get(&self, currency: &Currency) -> Option<Decimal> {
        self.0.get(currency).copied()
    }

    /// Looks up the rate for a currency.
    ///
    /// An explicit entry for a stablecoin wins over the USD entry it would
    /// otherwise share.
    #[must_use]
    pub fn rate(&self, currency: &Currency) -> RateLookup {
        if currency.is_pivot() {
            return RateLookup::Pivot;
        }

        let entry = self
            .get(currency)
            .or_else(|| self.get(&currency.rate_key()));

        match entry {
            Some(rate) if rate > Decimal::ZERO => RateLookup::Found(rate),
            Some(rate) => RateLookup::NonPositive(rate),
            None => RateLookup::Missing,
        }
    }

    /// Looks up the rate, failing on missing or non-positive entries.
    ///
    /// # Errors
    /// Returns [`RateError`] when no usable rate exists.
    pub fn rate_strict(&self, currency: &Currency) -> Result<Decimal, RateError> {
        match self.rate(currency) {
            RateLookup::Pivot => Ok(Decimal::ONE),
            RateLookup::Found(rate) => Ok(rate),
            RateLookup::Missing => Err(RateError::Missing {
                currency: currency.clone(),
            }),
            RateLookup::NonPositive(rate) => Err(RateError::NonPositive {
                currency: currency.clone(),
                rate,
            }),
        }
    }

    /// Returns the usable rate, substituting one when the entry is missing
    /// or non-positive.
    #[must_use]
    pub fn rate_or_fallback(&self, currency: &Currency) -> (Decimal, Option<MissingRateWarning>) {
        match self.rate(currency) {
            RateLookup::Pivot => (Decimal::ONE, None),
            RateLookup::Found(rate) => (rate, None),
            RateLookup::Missing => {
                warn!(currency = %currency, "Missing BRL rate, falling back to 1.0");
                (
                    Decimal::ONE,
                    Some(MissingRateWarning {
                        currency: currency.clone(),
                        configured: None,
                    }),
                )
            }
            RateLookup::NonPositive(rate) => {
                warn!(currency = %currency, rate = %rate, "Non-positive BRL rate, falling back to 1.0");
                (
                    Decimal::ONE,
                    Some(MissingRateWarning {
                        currency: currency.clone(),
                        configured: Some(rate),
                    }),
                )
            }
        }
    }

    /// Iterates over the entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&Currency, &Decimal)> {
        self.0.iter()
    }

    /// Returns the number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the table has no explicit entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Currency, Decimal)> for BrlRates {
    fn from_iter<T: IntoIterator<Item = (Currency, Decimal)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// Conversion
// =============================================================================

/// A rate that was replaced by one during a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissingRateWarning {
    /// Currency whose rate was unusable.
    pub currency: Currency,
    /// The non-positive rate found, or `None` if no entry existed.
    pub configured: Option<Decimal>,
}

impl std::fmt::Display for MissingRateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.configured {
            Some(rate) => write!(f, "{}: non-positive rate {} replaced by 1", self.currency, rate),
            None => write!(f, "{}: no rate configured, used 1", self.currency),
        }
    }
}

/// Result of a lenient conversion together with any rate fallbacks it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Converted amount.
    pub amount: Decimal,
    /// Fallbacks applied while converting.
    pub warnings: Vec<MissingRateWarning>,
    /// True when the result did not fit and `amount` was clamped.
    pub overflowed: bool,
}

impl Conversion {
    fn exact(amount: Decimal) -> Self {
        Self {
            amount,
            warnings: Vec::new(),
            overflowed: false,
        }
    }

    /// Returns the amount unless the conversion overflowed.
    #[must_use]
    pub fn checked(&self) -> Option<Decimal> {
        (!self.overflowed).then_some(self.amount)
    }

    /// Returns true if a rate fallback was applied.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Converts `amount` from one currency to another through BRL.
///
/// Missing or non-positive rates are replaced by one and logged; use
/// [`convert_detailed`] to see them or [`convert_strict`] to reject them.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use surebet_core::{convert, BrlRates, Currency};
///
/// let usd = Currency::new("USD").unwrap();
/// let eur = Currency::new("EUR").unwrap();
/// let rates = BrlRates::new()
///     .with_rate(usd.clone(), dec!(5.50))
///     .with_rate(eur.clone(), dec!(6.00));
///
/// assert_eq!(convert(dec!(195), &usd, &eur, &rates), dec!(178.75));
/// ```
#[must_use]
pub fn convert(amount: Decimal, from: &Currency, to: &Currency, rates: &BrlRates) -> Decimal {
    convert_detailed(amount, from, to, rates).amount
}

/// Converts `amount` and reports every rate fallback taken.
#[must_use]
pub fn convert_detailed(
    amount: Decimal,
    from: &Currency,
    to: &Currency,
    rates: &BrlRates,
) -> Conversion {
    // Identity and zero never touch the table
    if amount.is_zero() || from == to {
        return Conversion::exact(amount);
    }

    let (from_rate, from_warning) = rates.rate_or_fallback(from);
    let (to_rate, to_warning) = rates.rate_or_fallback(to);

    let converted = checked_scale(amount, from_rate, to_rate);
    if converted.is_none() {
        warn!(from = %from, to = %to, amount = %amount, "Conversion overflows, clamping");
    }

    Conversion {
        amount: converted.unwrap_or_else(|| saturated(amount)),
        warnings: from_warning.into_iter().chain(to_warning).collect(),
        overflowed: converted.is_none(),
    }
}

/// Converts `amount`, failing instead of falling back.
///
/// # Errors
/// Returns [`RateError`] if either currency lacks a usable rate or the
/// result does not fit in a `Decimal`.
pub fn convert_strict(
    amount: Decimal,
    from: &Currency,
    to: &Currency,
    rates: &BrlRates,
) -> Result<Decimal, RateError> {
    if amount.is_zero() || from == to {
        return Ok(amount);
    }

    let from_rate = rates.rate_strict(from)?;
    let to_rate = rates.rate_strict(to)?;
    checked_scale(amount, from_rate, to_rate).ok_or_else(|| RateError::Overflow {
        from: from.clone(),
        to: to.clone(),
    })
}
