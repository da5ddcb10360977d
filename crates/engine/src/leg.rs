//! Legs of an arbitrage operation.
//!
//! A leg is one bookmaker-side bet: a currency, a stake in that currency and
//! a decimal odd. Its [`StakeRole`] says whether the equalizer may rewrite
//! its stake.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surebet_core::{checked_sum, saturating_sum, Currency};
use thiserror::Error;

// =============================================================================
// Stake Role
// =============================================================================

/// Why a leg's stake is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedSource {
    /// The user typed the stake by hand.
    ManualEdit,
    /// The stake was read from a bet-slip screenshot.
    FromPrint,
}

/// How the equalizer treats a leg's stake.
///
/// A leg is exactly one of these, so "reference and fixed at once" cannot be
/// expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeRole {
    /// Stake is computed by the equalizer.
    #[default]
    Free,
    /// Stake anchors the target return for every other leg.
    Reference,
    /// Stake is kept verbatim.
    Fixed(FixedSource),
}

impl StakeRole {
    /// Returns true for the reference role.
    #[must_use]
    pub fn is_reference(self) -> bool {
        matches!(self, Self::Reference)
    }

    /// Returns true if the equalizer must keep this leg's stake.
    #[must_use]
    pub fn keeps_stake(self) -> bool {
        !matches!(self, Self::Free)
    }

    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Reference => "reference",
            Self::Fixed(FixedSource::ManualEdit) => "fixed",
            Self::Fixed(FixedSource::FromPrint) => "print",
        }
    }
}

impl std::fmt::Display for StakeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// =============================================================================
// Split Entries
// =============================================================================

/// One sub-entry of a split bet placed on the same outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegEntry {
    /// Stake of this entry.
    pub stake: Decimal,
    /// Decimal odd of this entry.
    pub odd: Decimal,
}

impl LegEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(stake: Decimal, odd: Decimal) -> Self {
        Self { stake, odd }
    }
}

/// Returns the stake-weighted average odd of a split bet.
///
/// Entries with a non-positive stake carry no weight. If no entry has a
/// positive stake, or the weighted sum cannot be represented, the plain mean
/// of the odds is returned so a half-filled form still shows a sensible odd.
#[must_use]
pub fn weighted_odd(entries: &[LegEntry]) -> Decimal {
    let staked = || entries.iter().filter(|e| e.stake > Decimal::ZERO);

    let weighted = checked_sum(staked().map(|e| e.stake)).and_then(|total| {
        let products: Option<Vec<Decimal>> =
            staked().map(|e| e.stake.checked_mul(e.odd)).collect();
        products
            .and_then(checked_sum)
            .and_then(|w| w.checked_div(total))
    });
    if let Some(odd) = weighted {
        return odd;
    }

    if entries.is_empty() {
        return Decimal::ZERO;
    }

    saturating_sum(entries.iter().map(|e| e.odd)) / Decimal::from(entries.len())
}

// =============================================================================
// Leg
// =============================================================================

/// One side of a multi-outcome arbitrage bet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Leg {
    /// Currency of the stake. `None` while the user has not picked one.
    pub currency: Option<Currency>,
    /// Stake in `currency`.
    pub stake: Decimal,
    /// Decimal odd (valid when above one).
    pub odd: Decimal,
    /// How the equalizer treats the stake.
    pub role: StakeRole,
}

impl Leg {
    /// Creates a free leg.
    #[must_use]
    pub fn new(currency: Currency, stake: Decimal, odd: Decimal) -> Self {
        Self {
            currency: Some(currency),
            stake,
            odd,
            role: StakeRole::Free,
        }
    }

    /// Creates the reference leg.
    #[must_use]
    pub fn reference(currency: Currency, stake: Decimal, odd: Decimal) -> Self {
        Self::new(currency, stake, odd).with_role(StakeRole::Reference)
    }

    /// Creates a leg whose stake the equalizer must keep.
    #[must_use]
    pub fn fixed(currency: Currency, stake: Decimal, odd: Decimal, source: FixedSource) -> Self {
        Self::new(currency, stake, odd).with_role(StakeRole::Fixed(source))
    }

    /// Creates a leg from split-bet entries.
    ///
    /// The stake is the sum of positive entry stakes and the odd is their
    /// weighted average.
    #[must_use]
    pub fn from_entries(currency: Currency, entries: &[LegEntry], role: StakeRole) -> Self {
        let stake = saturating_sum(
            entries
                .iter()
                .map(|e| e.stake)
                .filter(|s| *s > Decimal::ZERO),
        );

        Self {
            currency: Some(currency),
            stake,
            odd: weighted_odd(entries),
            role,
        }
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: StakeRole) -> Self {
        self.role = role;
        self
    }

    /// Sets the stake.
    #[must_use]
    pub fn with_stake(mut self, stake: Decimal) -> Self {
        self.stake = stake;
        self
    }

    /// Returns true if the odd can produce a winning payout.
    #[must_use]
    pub fn has_valid_odd(&self) -> bool {
        self.odd > Decimal::ONE
    }

    /// Returns true once odd, stake and currency are all filled in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.has_valid_odd() && self.stake > Decimal::ZERO && self.currency.is_some()
    }

    /// Returns the leg currency, or `default` if none was picked.
    #[must_use]
    pub fn currency_or<'a>(&'a self, default: &'a Currency) -> &'a Currency {
        self.currency.as_ref().unwrap_or(default)
    }

    /// Returns the payout in leg currency if this leg wins, or `None` when
    /// it does not fit in a `Decimal`.
    #[must_use]
    pub fn payout(&self) -> Option<Decimal> {
        self.stake.checked_mul(self.odd)
    }
}

// =============================================================================
// Operation
// =============================================================================

/// Errors reported by [`Operation::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// Fewer than two legs.
    #[error("An operation needs at least 2 legs, got {count}")]
    TooFewLegs {
        /// Number of legs supplied.
        count: usize,
    },

    /// More legs than the bet type allows.
    #[error("Bet type allows {expected} legs, got {count}")]
    TooManyLegs {
        /// Number of legs supplied.
        count: usize,
        /// Configured leg count.
        expected: usize,
    },

    /// More than one leg flagged as reference.
    #[error("Only one reference leg is allowed, found {count}")]
    MultipleReferences {
        /// Number of reference legs.
        count: usize,
    },

    /// A leg has a negative stake.
    #[error("Leg {leg} has negative stake {stake}")]
    NegativeStake {
        /// Zero-based leg index.
        leg: usize,
        /// Offending stake.
        stake: Decimal,
    },

    /// A leg has a negative odd.
    #[error("Leg {leg} has negative odd {odd}")]
    NegativeOdd {
        /// Zero-based leg index.
        leg: usize,
        /// Offending odd.
        odd: Decimal,
    },
}

/// A full set of legs for one bet type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// The legs, in outcome order.
    pub legs: Vec<Leg>,
    /// Number of legs the bet type expects.
    pub expected_legs: usize,
}

impl Operation {
    /// Creates a new operation.
    #[must_use]
    pub fn new(legs: Vec<Leg>, expected_legs: usize) -> Self {
        Self {
            legs,
            expected_legs,
        }
    }

    /// Returns the index of the single reference leg, if exactly one exists.
    #[must_use]
    pub fn reference_index(&self) -> Option<usize> {
        reference_index(&self.legs)
    }

    /// Returns the number of complete legs.
    #[must_use]
    pub fn complete_legs(&self) -> usize {
        self.legs.iter().filter(|l| l.is_complete()).count()
    }

    /// Checks the structural rules of an operation.
    ///
    /// The calculator does not require this; it is for callers that want to
    /// block submission of malformed input.
    ///
    /// # Errors
    /// Returns the first rule violated.
    pub fn validate(&self) -> Result<(), OperationError> {
        let count = self.legs.len();
        if count < 2 {
            return Err(OperationError::TooFewLegs { count });
        }
        if count > self.expected_legs.max(2) {
            return Err(OperationError::TooManyLegs {
                count,
                expected: self.expected_legs,
            });
        }

        let references = self.legs.iter().filter(|l| l.role.is_reference()).count();
        if references > 1 {
            return Err(OperationError::MultipleReferences { count: references });
        }

        for (leg, l) in self.legs.iter().enumerate() {
            if l.stake < Decimal::ZERO {
                return Err(OperationError::NegativeStake {
                    leg,
                    stake: l.stake,
                });
            }
            if l.odd < Decimal::ZERO {
                return Err(OperationError::NegativeOdd { leg, odd: l.odd });
            }
        }

        Ok(())
    }
}

/// Returns the index of the reference leg when exactly one leg holds the role.
#[must_use]
pub fn reference_index(legs: &[Leg]) -> Option<usize> {
    let mut found = None;
    for (i, leg) in legs.iter().enumerate() {
        if leg.role.is_reference() {
            if found.is_some() {
                return None;
            }
            found = Some(i);
        }
    }
    found
}
