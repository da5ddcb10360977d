//! Stake equalization across legs in different currencies.
//!
//! Given a reference leg, every free leg gets the stake whose payout matches
//! the reference payout once both are expressed in the consolidation
//! currency:
//!
//! ```text
//! reference: 100 USD @ 1.95      -> return 195 USD
//! other leg: EUR @ 2.05          -> 195 USD = 178.75 EUR
//!                                -> stake   = 178.75 / 2.05 = 87.20 EUR
//! ```
//!
//! Rounding is applied once, to the final stake of each computed leg.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surebet_core::{convert, convert_detailed, saturating_sum, Rounding};
use tracing::{debug, trace};

use crate::leg::{reference_index, Leg};
use crate::types::{EngineConfig, StakeSnapshot};

/// Output of one equalization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualizedStakes {
    /// Final stake per leg, in leg currency.
    pub stakes_local: Vec<Decimal>,
    /// Final stake per leg, in consolidation currency.
    pub stakes_consolidated: Vec<Decimal>,
    /// Sum of consolidated stakes.
    pub stake_total: Decimal,
    /// False when preconditions failed and the input stakes were echoed.
    pub is_valid: bool,
}

impl EqualizedStakes {
    /// Captures the local stakes as a directed-profit baseline.
    #[must_use]
    pub fn snapshot(&self) -> StakeSnapshot {
        StakeSnapshot::new(self.stakes_local.clone())
    }
}

/// Reasons the equalizer declined to compute stakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precondition {
    TooFewLegs,
    InvalidOdd(usize),
    NoReference,
    ReferenceWithoutStake,
    Overflow,
}

fn check_preconditions(legs: &[Leg]) -> Result<usize, Precondition> {
    if legs.len() < 2 {
        return Err(Precondition::TooFewLegs);
    }
    if let Some(i) = legs.iter().position(|l| !l.has_valid_odd()) {
        return Err(Precondition::InvalidOdd(i));
    }
    let ref_idx = reference_index(legs).ok_or(Precondition::NoReference)?;
    if legs[ref_idx].stake <= Decimal::ZERO {
        return Err(Precondition::ReferenceWithoutStake);
    }
    Ok(ref_idx)
}

/// Equalizes the stakes of every free leg against the reference leg.
///
/// Reference and fixed legs keep their stakes. If there are fewer than two
/// legs, any odd is not above one, there is not exactly one reference leg,
/// the reference stake is not positive, or a return does not fit in a
/// `Decimal`, the input stakes are echoed back with `is_valid = false`.
#[must_use]
pub fn equalize(legs: &[Leg], config: &EngineConfig, rounding: Rounding) -> EqualizedStakes {
    match check_preconditions(legs).and_then(|ref_idx| free_stakes(legs, ref_idx, config, rounding))
    {
        Ok(stakes_local) => finish(legs, stakes_local, config, true),
        Err(reason) => {
            debug!(?reason, legs = legs.len(), "Equalizer preconditions not met, echoing stakes");
            let echoed = legs.iter().map(|l| l.stake).collect::<Vec<_>>();
            finish(legs, echoed, config, false)
        }
    }
}

fn free_stakes(
    legs: &[Leg],
    ref_idx: usize,
    config: &EngineConfig,
    rounding: Rounding,
) -> Result<Vec<Decimal>, Precondition> {
    let consolidation = &config.consolidation_currency;
    let rates = &config.brl_rates;

    let reference = &legs[ref_idx];
    let ref_currency = reference.currency_or(consolidation);

    let target_return_ref = reference.payout().ok_or(Precondition::Overflow)?;
    let target_return = convert_detailed(target_return_ref, ref_currency, consolidation, rates)
        .checked()
        .ok_or(Precondition::Overflow)?;

    trace!(
        reference = ref_idx,
        target_return_ref = %target_return_ref,
        target_return = %target_return,
        consolidation = %consolidation,
        "Equalizing legs"
    );

    legs.iter()
        .enumerate()
        .map(|(i, leg)| {
            if i == ref_idx || leg.role.keeps_stake() {
                return Ok(leg.stake);
            }
            let currency = leg.currency_or(consolidation);
            convert_detailed(target_return, consolidation, currency, rates)
                .checked()
                .and_then(|target_local| target_local.checked_div(leg.odd))
                .map(|stake| rounding.apply(stake))
                .ok_or(Precondition::Overflow)
        })
        .collect()
}

fn finish(
    legs: &[Leg],
    stakes_local: Vec<Decimal>,
    config: &EngineConfig,
    is_valid: bool,
) -> EqualizedStakes {
    let consolidation = &config.consolidation_currency;
    let stakes_consolidated: Vec<Decimal> = legs
        .iter()
        .zip(&stakes_local)
        .map(|(leg, stake)| {
            convert(
                *stake,
                leg.currency_or(consolidation),
                consolidation,
                &config.brl_rates,
            )
        })
        .collect();
    let stake_total = saturating_sum(stakes_consolidated.iter().copied());

    EqualizedStakes {
        stakes_local,
        stakes_consolidated,
        stake_total,
        is_valid,
    }
}
