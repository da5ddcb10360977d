//! Surebet stake equalization and scenario analysis.
//!
//! A surebet covers every outcome of an event across bookmakers so that one
//! of the legs always pays more than the total staked. Legs may be staked in
//! different currencies; all of them are compared in a single consolidation
//! currency through BRL-pivot rates.
//!
//! # Overview
//!
//! ```text
//! Leg 1 (reference):  100.00 BRL @ 2.10   -> returns 210.00
//! Leg 2 (free):       ?      BRL @ 2.00   -> 210 / 2.00 = 105.00
//!
//! Total stake:        205.00 BRL
//! Either outcome:     +5.00 BRL (2.44%)
//! ```
//!
//! # Modules
//!
//! - [`leg`]: Legs, stake roles and operation validation
//! - [`types`]: Engine configuration, stake snapshots
//! - [`equalizer`]: Equalize free legs against the reference leg
//! - [`directed`]: Steer all profit into one leg
//! - [`scenario`]: Per-outcome profit and ROI
//! - [`calculator`]: One calculation pass over the above
//! - [`report`]: Plain-text reports
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use surebet_core::Currency;
//! use surebet_engine::{EngineConfig, Leg, SurebetCalculator};
//!
//! let legs = vec![
//!     Leg::reference(Currency::brl(), dec!(100), dec!(2.10)),
//!     Leg::new(Currency::brl(), dec!(0), dec!(2.00)),
//! ];
//!
//! let calc = SurebetCalculator::new(EngineConfig::brl_only());
//! let result = calc.calculate(&legs, None);
//!
//! assert_eq!(result.analysis.stakes_local[1], dec!(105));
//! assert!(result.analysis.is_valid_arbitrage);
//! ```

pub mod calculator;
pub mod directed;
pub mod equalizer;
pub mod leg;
pub mod report;
pub mod scenario;
pub mod types;

// Re-export main types for convenience
pub use calculator::{Calculation, SurebetCalculator};
pub use directed::{redirect, DirectedProfit};
pub use equalizer::{equalize, EqualizedStakes};
pub use leg::{
    reference_index, weighted_odd, FixedSource, Leg, LegEntry, Operation, OperationError,
    StakeRole,
};
pub use report::AnalysisFormatter;
pub use scenario::{analyze, Analysis, ScenarioResult};
pub use types::{EngineConfig, StakeSnapshot, StakeSource};

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use surebet_core::{Currency, Rounding};

    #[test]
    fn test_public_api_exports() {
        let _ = EngineConfig::default();
        let _ = SurebetCalculator::new(EngineConfig::brl_only());
        let _ = StakeSnapshot::new(vec![]);
        let _ = Leg::default();
    }

    #[test]
    fn test_types_accessible() {
        let _ = StakeRole::Free;
        let _ = StakeRole::Reference;
        let _ = StakeRole::Fixed(FixedSource::ManualEdit);
        let _ = StakeSource::Directed;
        let _ = StakeSource::Equalized;
        let _ = StakeSource::Raw;
    }

    #[test]
    fn test_integration_equalize_then_redirect() {
        let legs = vec![
            Leg::reference(Currency::brl(), dec!(100), dec!(2.10)),
            Leg::new(Currency::brl(), Decimal::ZERO, dec!(2.00)),
        ];
        let equalized = equalize(&legs, &EngineConfig::brl_only(), Rounding::Cents);
        let odds: Vec<Decimal> = legs.iter().map(|l| l.odd).collect();

        let stakes = redirect(&odds, equalized.snapshot().stakes(), &[1], Rounding::Cents);
        assert_eq!(stakes, Some(vec![dec!(100), dec!(110)]));
    }
}
