use serde::{Deserialize, Serialize};

use crate::currency::{BrlRates, Currency};
use crate::rates::{default_fallback_rates, RateResolver};
use crate::rounding::Rounding;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineSettings,
    pub rates: RateSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Currency in which stake totals, profit and ROI are reported.
    pub consolidation_currency: Currency,
    /// Number of legs a complete operation of the default bet type has.
    pub expected_legs: usize,
    pub rounding: Rounding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSettings {
    pub manual: BrlRates,
    pub official: BrlRates,
    pub fallback: BrlRates,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            consolidation_currency: Currency::brl(),
            expected_legs: 2,
            rounding: Rounding::Cents,
        }
    }
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            manual: BrlRates::new(),
            official: BrlRates::new(),
            fallback: default_fallback_rates(),
        }
    }
}

impl RateSettings {
    #[must_use]
    pub fn resolver(&self) -> RateResolver {
        RateResolver::new()
            .with_manual(self.manual.clone())
            .with_official(self.official.clone())
            .with_fallback(self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.engine.consolidation_currency, Currency::brl());
        assert_eq!(config.engine.expected_legs, 2);
        assert_eq!(config.engine.rounding, Rounding::Cents);
        assert_eq!(config.rates.fallback.get(&Currency::usd()), Some(dec!(5.00)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"engine": {"consolidation_currency": "usd"}}"#).unwrap();
        assert_eq!(config.engine.consolidation_currency, Currency::usd());
        assert_eq!(config.engine.expected_legs, 2);
        assert!(!config.rates.fallback.is_empty());
    }

    #[test]
    fn test_resolver_uses_all_tiers() {
        let mut config = AppConfig::default();
        config.rates.manual.insert(Currency::usd(), dec!(5.70));

        let resolver = config.rates.resolver();
        assert_eq!(resolver.resolve_one(&Currency::usd()).unwrap().rate, dec!(5.70));
        assert_eq!(resolver.resolve_one(&Currency::eur()).unwrap().rate, dec!(5.40));
    }
}
