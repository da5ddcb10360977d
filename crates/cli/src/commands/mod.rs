//! CLI commands for the surebet calculator.

pub mod calc;
pub mod convert;
pub mod rates;

pub use calc::{run_calc, CalcArgs};
pub use convert::{run_convert, ConvertArgs};
pub use rates::{run_rates, RatesArgs};

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use surebet_core::Currency;

/// Parses a `CUR=RATE` override, e.g. `USD=5.31`.
pub fn parse_rate_override(s: &str) -> Result<(Currency, Decimal)> {
    let (code, rate) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid rate override: '{}'. Expected CUR=RATE", s))?;
    let currency: Currency = code.parse()?;
    let rate: Decimal = rate
        .trim()
        .parse()
        .map_err(|e| anyhow!("Invalid rate for {}: {}", currency, e))?;
    Ok((currency, rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_rate_override() {
        let (currency, rate) = parse_rate_override("usd=5.31").unwrap();
        assert_eq!(currency, Currency::usd());
        assert_eq!(rate, dec!(5.31));
    }

    #[test]
    fn test_parse_rate_override_rejects_garbage() {
        assert!(parse_rate_override("USD").is_err());
        assert!(parse_rate_override("USD=abc").is_err());
        assert!(parse_rate_override("=5").is_err());
    }
}
