//! Shared types for the calculation engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surebet_core::{BrlRates, Currency};

// =============================================================================
// Engine Configuration
// =============================================================================

/// Inputs shared by every stage of a calculation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Currency of stake totals, profit and ROI.
    pub consolidation_currency: Currency,
    /// Pivot table used for all conversions.
    pub brl_rates: BrlRates,
}

impl EngineConfig {
    /// Creates a new engine configuration.
    #[must_use]
    pub fn new(consolidation_currency: Currency, brl_rates: BrlRates) -> Self {
        Self {
            consolidation_currency,
            brl_rates,
        }
    }

    /// Consolidates in BRL with an empty rate table.
    #[must_use]
    pub fn brl_only() -> Self {
        Self::new(Currency::brl(), BrlRates::new())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::brl_only()
    }
}

// =============================================================================
// Stake Snapshot
// =============================================================================

/// Immutable copy of the local stakes produced by one equalization pass.
///
/// The directed-profit adjuster always reads its baseline from a snapshot,
/// never from stakes it has already adjusted, so toggling the directed leg
/// on and off cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSnapshot {
    stakes_local: Vec<Decimal>,
}

impl StakeSnapshot {
    /// Captures a snapshot of local stakes.
    #[must_use]
    pub fn new(stakes_local: Vec<Decimal>) -> Self {
        Self { stakes_local }
    }

    /// Returns the captured stakes.
    #[must_use]
    pub fn stakes(&self) -> &[Decimal] {
        &self.stakes_local
    }

    /// Returns the number of legs captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stakes_local.len()
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stakes_local.is_empty()
    }
}

// =============================================================================
// Stake Source
// =============================================================================

/// Which path produced the stakes fed to the scenario analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeSource {
    /// Directed-profit adjustment.
    Directed,
    /// Stake equalizer.
    Equalized,
    /// The user's stakes, unmodified.
    Raw,
}

impl StakeSource {
    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Directed => "directed",
            Self::Equalized => "equalized",
            Self::Raw => "raw",
        }
    }
}

impl std::fmt::Display for StakeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
