//! Calculation pass orchestration.
//!
//! Picks the stakes for a pass, in order:
//!
//! 1. Directed-profit stakes, when a directed request is active and valid
//! 2. Equalized stakes, when the equalizer's preconditions hold
//! 3. The user's stakes unmodified, so an incomplete form never blocks entry
//!
//! Whichever path wins feeds the same scenario analyzer. Nothing is cached
//! between passes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surebet_core::{convert, AppConfig, BrlRates, Rounding};
use tracing::debug;

use crate::directed::{redirect, DirectedProfit};
use crate::equalizer::equalize;
use crate::leg::Leg;
use crate::scenario::{analyze, Analysis};
use crate::types::{EngineConfig, StakeSnapshot, StakeSource};

/// Result of one calculation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    /// Scenario analysis of the chosen stakes.
    pub analysis: Analysis,
    /// Path that produced the stakes.
    pub source: StakeSource,
    /// Equalized stakes of this pass, to seed a later directed request.
    pub baseline: StakeSnapshot,
}

/// Surebet calculator bound to one engine configuration.
#[derive(Debug, Clone)]
pub struct SurebetCalculator {
    engine: EngineConfig,
    rounding: Rounding,
    expected_legs: usize,
}

impl SurebetCalculator {
    /// Creates a calculator for two-leg operations with cent rounding.
    #[must_use]
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            engine,
            rounding: Rounding::Cents,
            expected_legs: 2,
        }
    }

    /// Creates a calculator from application settings and a resolved table.
    #[must_use]
    pub fn from_config(config: &AppConfig, brl_rates: BrlRates) -> Self {
        Self {
            engine: EngineConfig::new(config.engine.consolidation_currency.clone(), brl_rates),
            rounding: config.engine.rounding,
            expected_legs: config.engine.expected_legs,
        }
    }

    /// Sets the rounding policy.
    #[must_use]
    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Sets the expected leg count.
    #[must_use]
    pub fn with_expected_legs(mut self, expected_legs: usize) -> Self {
        self.expected_legs = expected_legs;
        self
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Returns the rounding policy.
    #[must_use]
    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Returns the expected leg count.
    #[must_use]
    pub fn expected_legs(&self) -> usize {
        self.expected_legs
    }

    /// Runs the equalizer alone and captures its stakes as a baseline.
    #[must_use]
    pub fn snapshot(&self, legs: &[Leg]) -> StakeSnapshot {
        equalize(legs, &self.engine, self.rounding).snapshot()
    }

    /// Runs one calculation pass.
    #[must_use]
    pub fn calculate(&self, legs: &[Leg], directed: Option<&DirectedProfit>) -> Calculation {
        let equalized = equalize(legs, &self.engine, self.rounding);
        let baseline = equalized.snapshot();

        let directed_stakes = directed.and_then(|d| self.directed_stakes(legs, d));

        let (stakes, source) = match directed_stakes {
            Some(stakes) => (stakes, StakeSource::Directed),
            None if equalized.is_valid => (equalized.stakes_local, StakeSource::Equalized),
            None => {
                debug!("Falling back to entered stakes");
                (legs.iter().map(|l| l.stake).collect(), StakeSource::Raw)
            }
        };

        let analysis = analyze(legs, &stakes, &self.engine, self.expected_legs);

        Calculation {
            analysis,
            source,
            baseline,
        }
    }

    /// Computes directed-profit stakes in leg currencies.
    ///
    /// Single-currency operations redirect local stakes directly. Mixed
    /// operations redirect in consolidation currency, then convert the marked
    /// stake back to its own currency before rounding; frozen legs keep their
    /// baseline local stakes.
    fn directed_stakes(&self, legs: &[Leg], directed: &DirectedProfit) -> Option<Vec<Decimal>> {
        let baseline = directed.baseline.stakes();
        if baseline.len() != legs.len() {
            debug!(
                baseline = baseline.len(),
                legs = legs.len(),
                "Directed baseline does not match legs"
            );
            return None;
        }

        let odds: Vec<Decimal> = legs.iter().map(|l| l.odd).collect();
        let consolidation = &self.engine.consolidation_currency;

        let first = legs.first()?.currency_or(consolidation);
        let single_currency = legs
            .iter()
            .all(|l| l.currency_or(consolidation) == first);

        if single_currency {
            return redirect(&odds, baseline, &directed.marked_legs, self.rounding);
        }

        let marked = directed.single_marked()?;
        let baseline_consolidated: Vec<Decimal> = legs
            .iter()
            .zip(baseline)
            .map(|(leg, stake)| {
                convert(
                    *stake,
                    leg.currency_or(consolidation),
                    consolidation,
                    &self.engine.brl_rates,
                )
            })
            .collect();

        let redirected = redirect(
            &odds,
            &baseline_consolidated,
            &directed.marked_legs,
            Rounding::Exact,
        )?;

        let marked_local = convert(
            redirected[marked],
            consolidation,
            legs[marked].currency_or(consolidation),
            &self.engine.brl_rates,
        );

        let mut stakes = baseline.to_vec();
        stakes[marked] = self.rounding.apply(marked_local);
        Some(stakes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leg::FixedSource;
    use rust_decimal_macros::dec;
    use surebet_core::Currency;

    fn cur(code: &str) -> Currency {
        Currency::new(code).unwrap()
    }

    fn brl_legs() -> Vec<Leg> {
        vec![
            Leg::reference(Currency::brl(), dec!(100), dec!(2.10)),
            Leg::new(Currency::brl(), Decimal::ZERO, dec!(2.00)),
        ]
    }

    fn multi_calculator() -> SurebetCalculator {
        SurebetCalculator::new(EngineConfig::new(
            cur("USD"),
            BrlRates::new()
                .with_rate(cur("USD"), dec!(5.50))
                .with_rate(cur("EUR"), dec!(6.00)),
        ))
    }

    // ==================== Path Selection Tests ====================

    #[test]
    fn test_equalized_path() {
        let calc = SurebetCalculator::new(EngineConfig::brl_only());
        let result = calc.calculate(&brl_legs(), None);

        assert_eq!(result.source, StakeSource::Equalized);
        assert_eq!(result.analysis.stakes_local, vec![dec!(100), dec!(105)]);
        assert_eq!(result.analysis.min_profit, dec!(5));
        assert!(result.analysis.is_valid_arbitrage);
    }

    #[test]
    fn test_raw_path_when_incomplete() {
        let calc = SurebetCalculator::new(EngineConfig::brl_only());
        let legs = vec![
            Leg::reference(Currency::brl(), dec!(100), dec!(2.10)),
            Leg::new(Currency::brl(), dec!(30), Decimal::ZERO),
        ];
        let result = calc.calculate(&legs, None);

        assert_eq!(result.source, StakeSource::Raw);
        assert_eq!(result.analysis.stakes_local, vec![dec!(100), dec!(30)]);
        assert!(!result.analysis.is_valid_arbitrage);
    }

    #[test]
    fn test_directed_path() {
        let calc = SurebetCalculator::new(EngineConfig::brl_only());
        let legs = brl_legs();
        let baseline = calc.snapshot(&legs);

        let directed = DirectedProfit::new(1, baseline);
        let result = calc.calculate(&legs, Some(&directed));

        assert_eq!(result.source, StakeSource::Directed);
        assert_eq!(result.analysis.stakes_local, vec![dec!(100), dec!(110)]);
        // A wins: 210 - 210 = 0; B wins: 220 - 210 = 10
        assert_eq!(result.analysis.scenarios[0].profit, Decimal::ZERO);
        assert_eq!(result.analysis.scenarios[1].profit, dec!(10));
        assert!(result.analysis.is_valid_arbitrage);
    }

    #[test]
    fn test_invalid_directed_falls_back_to_equalized() {
        let calc = SurebetCalculator::new(EngineConfig::brl_only());
        let legs = brl_legs();
        let directed = DirectedProfit {
            marked_legs: vec![0, 1],
            baseline: calc.snapshot(&legs),
        };
        let result = calc.calculate(&legs, Some(&directed));
        assert_eq!(result.source, StakeSource::Equalized);
    }

    #[test]
    fn test_stale_baseline_is_ignored() {
        let calc = SurebetCalculator::new(EngineConfig::brl_only());
        let directed = DirectedProfit::new(1, StakeSnapshot::new(vec![dec!(100)]));
        let result = calc.calculate(&brl_legs(), Some(&directed));
        assert_eq!(result.source, StakeSource::Equalized);
    }

    // ==================== Directed Idempotence Tests ====================

    #[test]
    fn test_toggle_directed_is_stable() {
        let calc = SurebetCalculator::new(EngineConfig::brl_only());
        let legs = brl_legs();
        let baseline = calc.calculate(&legs, None).baseline;
        let directed = DirectedProfit::new(1, baseline.clone());

        let on = calc.calculate(&legs, Some(&directed));
        let off = calc.calculate(&legs, None);
        let on_again = calc.calculate(&legs, Some(&directed));

        assert_eq!(off.analysis.stakes_local[1], dec!(105));
        assert_eq!(on.analysis.stakes_local, on_again.analysis.stakes_local);
        assert_eq!(off.baseline, baseline);
    }

    // ==================== Multi-Currency Tests ====================

    #[test]
    fn test_multi_currency_directed() {
        let calc = multi_calculator();
        let legs = vec![
            Leg::reference(cur("USD"), dec!(100), dec!(2.10)),
            Leg::new(cur("EUR"), Decimal::ZERO, dec!(2.10)),
        ];
        let baseline = calc.snapshot(&legs);
        // 210 USD = 192.50 EUR -> 91.67 EUR
        assert_eq!(baseline.stakes()[1], dec!(91.67));

        let result = calc.calculate(&legs, Some(&DirectedProfit::new(1, baseline)));
        assert_eq!(result.source, StakeSource::Directed);
        assert_eq!(result.analysis.stakes_local[0], dec!(100));

        // Frozen return 210 USD, frozen total 100 USD -> 110 USD = 100.83 EUR
        assert_eq!(result.analysis.stakes_local[1], dec!(100.83));
        assert!(result.analysis.scenarios[0].profit.abs() < dec!(0.01));
    }

    #[test]
    fn test_stablecoin_with_own_rate_directed() {
        let calc = SurebetCalculator::new(EngineConfig::new(
            cur("USD"),
            BrlRates::new()
                .with_rate(cur("USD"), dec!(5.50))
                .with_rate(cur("USDT"), dec!(5.00)),
        ));
        let legs = vec![
            Leg::reference(cur("USD"), dec!(100), dec!(2.10)),
            Leg::new(cur("USDT"), Decimal::ZERO, dec!(2.00)),
        ];

        // 210 USD = 231 USDT -> 115.50 USDT
        let baseline = calc.snapshot(&legs);
        assert_eq!(baseline.stakes(), &[dec!(100), dec!(115.50)]);

        // Frozen return 210 USD, frozen total 100 USD -> 110 USD = 121 USDT
        let result = calc.calculate(&legs, Some(&DirectedProfit::new(1, baseline)));
        assert_eq!(result.source, StakeSource::Directed);
        assert_eq!(result.analysis.stakes_local, vec![dec!(100), dec!(121)]);
        assert!(result.analysis.is_multi_currency);
    }

    #[test]
    fn test_fixed_leg_kept_through_calculation() {
        let calc = SurebetCalculator::new(EngineConfig::brl_only()).with_expected_legs(3);
        let legs = vec![
            Leg::reference(Currency::brl(), dec!(100), dec!(3.00)),
            Leg::fixed(Currency::brl(), dec!(90), dec!(3.20), FixedSource::FromPrint),
            Leg::new(Currency::brl(), Decimal::ZERO, dec!(4.00)),
        ];
        let result = calc.calculate(&legs, None);

        assert_eq!(result.analysis.stakes_local, vec![dec!(100), dec!(90), dec!(75)]);
        assert!(result.analysis.is_valid_arbitrage);
    }

    // ==================== Overflow Tests ====================

    #[test]
    fn test_huge_reference_stake_does_not_panic() {
        let calc = SurebetCalculator::new(EngineConfig::brl_only());
        let legs = vec![
            Leg::reference(Currency::brl(), dec!(50000000000000000000000000000), dec!(2.10)),
            Leg::new(Currency::brl(), Decimal::ZERO, dec!(2.00)),
        ];
        let baseline = calc.snapshot(&legs);
        let result = calc.calculate(&legs, Some(&DirectedProfit::new(1, baseline)));

        assert_eq!(result.source, StakeSource::Raw);
        assert!(!result.analysis.is_valid_arbitrage);
        assert!(result.analysis.min_profit < Decimal::ZERO);
    }

    #[test]
    fn test_huge_multi_currency_stake_does_not_panic() {
        let calc = multi_calculator();
        let legs = vec![
            Leg::reference(cur("EUR"), dec!(50000000000000000000000000000), dec!(2.10)),
            Leg::new(cur("USD"), Decimal::ZERO, dec!(2.00)),
        ];
        let result = calc.calculate(&legs, None);

        assert_eq!(result.source, StakeSource::Raw);
        assert!(!result.analysis.is_valid_arbitrage);
    }

    // ==================== Config Tests ====================

    #[test]
    fn test_from_config() {
        let mut config = AppConfig::default();
        config.engine.consolidation_currency = cur("USD");
        config.engine.expected_legs = 3;
        config.engine.rounding = Rounding::Nearest(dec!(5));

        let calc = SurebetCalculator::from_config(&config, BrlRates::new());
        assert_eq!(calc.engine().consolidation_currency, cur("USD"));
        assert_eq!(calc.expected_legs(), 3);
        assert_eq!(calc.rounding(), Rounding::Nearest(dec!(5)));
    }
}
