//! Per-outcome profit analysis.
//!
//! For each leg the analyzer asks "what if this outcome wins?": the leg pays
//! `stake × odd`, every stake is lost, and the difference is the profit for
//! that scenario. An operation is an arbitrage when no scenario loses money.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use surebet_core::{
    checked_sum, convert_detailed, saturated, saturating_sum, Currency, MissingRateWarning,
};
use tracing::trace;

use crate::leg::Leg;
use crate::types::EngineConfig;

// =============================================================================
// Results
// =============================================================================

/// Outcome of one leg winning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Zero-based index of the winning leg.
    pub leg_index: usize,
    /// Stake in leg currency.
    pub stake_local: Decimal,
    /// Stake in consolidation currency.
    pub stake_consolidated: Decimal,
    /// Payout in leg currency.
    pub payout_local: Decimal,
    /// Payout in consolidation currency.
    pub payout_consolidated: Decimal,
    /// Payout minus the total stake, in consolidation currency.
    pub profit: Decimal,
    /// Profit over total stake, as a percentage.
    pub roi: Decimal,
    /// True when this outcome does not lose money.
    pub is_positive: bool,
}

/// Full analysis of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Final stake per leg, in leg currency.
    pub stakes_local: Vec<Decimal>,
    /// Final stake per leg, in consolidation currency.
    pub stakes_consolidated: Vec<Decimal>,
    /// Sum of consolidated stakes.
    pub stake_total: Decimal,
    /// One scenario per leg.
    pub scenarios: Vec<ScenarioResult>,
    pub min_profit: Decimal,
    pub max_profit: Decimal,
    pub min_roi: Decimal,
    pub max_roi: Decimal,
    /// True when legs use more than one currency.
    pub is_multi_currency: bool,
    /// True when enough legs are complete and no scenario loses money.
    pub is_valid_arbitrage: bool,
    /// Legs with a valid odd, a positive stake and a currency.
    pub complete_legs: usize,
    /// True while at least two, but fewer than expected, legs are complete.
    pub is_partial: bool,
    /// Currency totals are reported in.
    pub consolidation_currency: Currency,
    /// Currency to show totals in: the consolidation currency when mixed,
    /// otherwise the single currency in use.
    pub display_currency: Currency,
    /// Rates that were missing or unusable and replaced by one.
    pub rate_warnings: Vec<MissingRateWarning>,
}

impl Analysis {
    /// Returns the scenario for a leg.
    #[must_use]
    pub fn scenario_for(&self, leg_index: usize) -> Option<&ScenarioResult> {
        self.scenarios.iter().find(|s| s.leg_index == leg_index)
    }

    /// Returns true if any rate fell back to one.
    #[must_use]
    pub fn has_rate_warnings(&self) -> bool {
        !self.rate_warnings.is_empty()
    }
}

// =============================================================================
// Analyzer
// =============================================================================

#[derive(Default)]
struct WarningSink(BTreeSet<(Currency, Option<Decimal>)>);

impl WarningSink {
    fn extend(&mut self, warnings: Vec<MissingRateWarning>) {
        for w in warnings {
            self.0.insert((w.currency, w.configured));
        }
    }

    fn into_vec(self) -> Vec<MissingRateWarning> {
        self.0
            .into_iter()
            .map(|(currency, configured)| MissingRateWarning {
                currency,
                configured,
            })
            .collect()
    }
}

fn roi_of(profit: Decimal, stake_total: Decimal) -> Decimal {
    if stake_total.is_zero() {
        return Decimal::ZERO;
    }
    profit
        .checked_div(stake_total)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .unwrap_or_else(|| saturated(profit))
}

/// Analyzes every win scenario for the given stakes.
///
/// `stakes_local` holds the effective stake of each leg in its own currency;
/// a missing entry falls back to the leg's own stake. A leg whose odd is not
/// above one, or whose stake is not positive, cannot win meaningfully, so its
/// scenario is a full loss of the total stake.
///
/// Amounts too large for a `Decimal` are clamped. A scenario whose payout
/// overflows counts as a full loss, and any overflow rules out a valid
/// arbitrage.
#[must_use]
pub fn analyze(
    legs: &[Leg],
    stakes_local: &[Decimal],
    config: &EngineConfig,
    expected_legs: usize,
) -> Analysis {
    let consolidation = &config.consolidation_currency;
    let rates = &config.brl_rates;
    let mut warnings = WarningSink::default();
    let mut overflowed = false;

    let stakes_local: Vec<Decimal> = legs
        .iter()
        .enumerate()
        .map(|(i, leg)| stakes_local.get(i).copied().unwrap_or(leg.stake))
        .collect();

    let stakes_consolidated: Vec<Decimal> = legs
        .iter()
        .zip(&stakes_local)
        .map(|(leg, stake)| {
            let conversion =
                convert_detailed(*stake, leg.currency_or(consolidation), consolidation, rates);
            warnings.extend(conversion.warnings);
            overflowed |= conversion.overflowed;
            conversion.amount
        })
        .collect();

    overflowed |= checked_sum(stakes_consolidated.iter().copied()).is_none();
    let stake_total = saturating_sum(stakes_consolidated.iter().copied());

    let scenarios: Vec<ScenarioResult> = legs
        .iter()
        .enumerate()
        .map(|(i, leg)| {
            let stake_local = stakes_local[i];
            let stake_consolidated = stakes_consolidated[i];

            let can_win = leg.has_valid_odd() && stake_local > Decimal::ZERO;
            let payout = if can_win {
                stake_local.checked_mul(leg.odd).and_then(|local| {
                    let conversion = convert_detailed(
                        local,
                        leg.currency_or(consolidation),
                        consolidation,
                        rates,
                    );
                    let checked = conversion.checked();
                    warnings.extend(conversion.warnings);
                    checked.map(|consolidated| (local, consolidated))
                })
            } else {
                None
            };

            let Some((payout_local, payout_consolidated)) = payout else {
                if can_win {
                    overflowed = true;
                    trace!(leg = i, "Payout overflows, scoring as a loss");
                }
                let profit = -stake_total;
                return ScenarioResult {
                    leg_index: i,
                    stake_local,
                    stake_consolidated,
                    payout_local: Decimal::ZERO,
                    payout_consolidated: Decimal::ZERO,
                    profit,
                    roi: roi_of(profit, stake_total),
                    is_positive: false,
                };
            };

            let profit = payout_consolidated.saturating_sub(stake_total);

            ScenarioResult {
                leg_index: i,
                stake_local,
                stake_consolidated,
                payout_local,
                payout_consolidated,
                profit,
                roi: roi_of(profit, stake_total),
                is_positive: profit >= Decimal::ZERO,
            }
        })
        .collect();

    let min_profit = scenarios.iter().map(|s| s.profit).min().unwrap_or_default();
    let max_profit = scenarios.iter().map(|s| s.profit).max().unwrap_or_default();
    let min_roi = scenarios.iter().map(|s| s.roi).min().unwrap_or_default();
    let max_roi = scenarios.iter().map(|s| s.roi).max().unwrap_or_default();

    let complete_legs = legs.iter().filter(|l| l.is_complete()).count();
    let expected = expected_legs.max(2);
    let is_valid_arbitrage = !overflowed
        && !scenarios.is_empty()
        && complete_legs >= expected
        && min_profit >= Decimal::ZERO;
    let is_partial = complete_legs >= 2 && complete_legs < expected;

    let currencies: BTreeSet<&Currency> = legs.iter().filter_map(|l| l.currency.as_ref()).collect();
    let is_multi_currency = currencies.len() > 1;
    let display_currency = match (is_multi_currency, currencies.iter().next()) {
        (false, Some(only)) => (*only).clone(),
        _ => consolidation.clone(),
    };

    trace!(
        legs = legs.len(),
        stake_total = %stake_total,
        min_profit = %min_profit,
        max_profit = %max_profit,
        complete_legs,
        is_valid_arbitrage,
        "Scenario analysis complete"
    );

    Analysis {
        stakes_local,
        stakes_consolidated,
        stake_total,
        scenarios,
        min_profit,
        max_profit,
        min_roi,
        max_roi,
        is_multi_currency,
        is_valid_arbitrage,
        complete_legs,
        is_partial,
        consolidation_currency: consolidation.clone(),
        display_currency,
        rate_warnings: warnings.into_vec(),
    }
}
