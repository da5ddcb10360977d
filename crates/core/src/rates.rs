//! Rate-source precedence.
//!
//! Callers hand the engine a single [`BrlRates`] table. This module builds that
//! table from three tiers, first usable rate wins:
//!
//! 1. Manual ("trabalho") rates typed in by the operator
//! 2. Official PTAX rates
//! 3. Hardcoded fallback rates
//!
//! The engine itself never consults the resolver.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::currency::{BrlRates, Currency, RateLookup};

// =============================================================================
// Rate Sources
// =============================================================================

/// Where a resolved rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// The currency is BRL.
    Pivot,
    /// Operator-entered working rate.
    Manual,
    /// Official PTAX rate.
    Official,
    /// Hardcoded fallback.
    Fallback,
}

impl RateSource {
    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pivot => "pivot",
            Self::Manual => "manual",
            Self::Official => "ptax",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A rate picked by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    /// Currency the rate applies to.
    pub currency: Currency,
    /// BRL per unit.
    pub rate: Decimal,
    /// Tier that supplied the rate.
    pub source: RateSource,
}

/// Hardcoded BRL rates used when neither manual nor official rates exist.
#[must_use]
pub fn default_fallback_rates() -> BrlRates {
    BrlRates::new()
        .with_rate(Currency::usd(), dec!(5.00))
        .with_rate(Currency::eur(), dec!(5.40))
        .with_rate(Currency::gbp(), dec!(6.30))
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves a BRL rate table from the three rate tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateResolver {
    manual: BrlRates,
    official: BrlRates,
    fallback: BrlRates,
}

impl RateResolver {
    /// Creates a resolver with only the built-in fallback tier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            manual: BrlRates::new(),
            official: BrlRates::new(),
            fallback: default_fallback_rates(),
        }
    }

    /// Sets the manual tier.
    #[must_use]
    pub fn with_manual(mut self, manual: BrlRates) -> Self {
        self.manual = manual;
        self
    }

    /// Sets the official tier.
    #[must_use]
    pub fn with_official(mut self, official: BrlRates) -> Self {
        self.official = official;
        self
    }

    /// Sets the fallback tier.
    #[must_use]
    pub fn with_fallback(mut self, fallback: BrlRates) -> Self {
        self.fallback = fallback;
        self
    }

    /// Overlays extra manual rates on top of the existing manual tier.
    #[must_use]
    pub fn with_manual_overrides(mut self, overrides: &BrlRates) -> Self {
        for (currency, rate) in overrides.iter() {
            self.manual.insert(currency.clone(), *rate);
        }
        self
    }

    /// Resolves the rate for one currency.
    ///
    /// Returns `None` when no tier holds a positive rate.
    #[must_use]
    pub fn resolve_one(&self, currency: &Currency) -> Option<ResolvedRate> {
        if currency.is_pivot() {
            return Some(ResolvedRate {
                currency: currency.clone(),
                rate: Decimal::ONE,
                source: RateSource::Pivot,
            });
        }

        let tiers = [
            (&self.manual, RateSource::Manual),
            (&self.official, RateSource::Official),
            (&self.fallback, RateSource::Fallback),
        ];

        for (table, source) in tiers {
            match table.rate(currency) {
                RateLookup::Found(rate) => {
                    return Some(ResolvedRate {
                        currency: currency.clone(),
                        rate,
                        source,
                    });
                }
                RateLookup::NonPositive(rate) => {
                    debug!(currency = %currency, source = %source, rate = %rate, "Skipping non-positive rate");
                }
                RateLookup::Missing | RateLookup::Pivot => {}
            }
        }

        None
    }

    /// Builds a table covering the given currencies.
    ///
    /// Currencies no tier can price are left out; the engine then applies its
    /// own fallback of one.
    #[must_use]
    pub fn resolve<'a>(&self, currencies: impl IntoIterator<Item = &'a Currency>) -> BrlRates {
        currencies
            .into_iter()
            .filter(|c| !c.is_pivot())
            .filter_map(|c| self.resolve_one(c))
            .map(|resolved| (resolved.currency, resolved.rate))
            .collect()
    }

    /// Returns every currency any tier knows about.
    #[must_use]
    pub fn known_currencies(&self) -> BTreeSet<Currency> {
        self.manual
            .iter()
            .chain(self.official.iter())
            .chain(self.fallback.iter())
            .map(|(c, _)| c.clone())
            .filter(|c| !c.is_pivot())
            .collect()
    }

    /// Resolves every known currency, with its source.
    #[must_use]
    pub fn resolve_detailed(&self) -> Vec<ResolvedRate> {
        self.known_currencies()
            .iter()
            .filter_map(|c| self.resolve_one(c))
            .collect()
    }

    /// Builds a table covering every known currency.
    #[must_use]
    pub fn resolve_all(&self) -> BrlRates {
        let known = self.known_currencies();
        self.resolve(known.iter())
    }
}
