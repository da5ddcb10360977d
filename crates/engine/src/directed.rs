//! Directed-profit adjustment.
//!
//! Equalized stakes spread the arbitrage profit evenly over every outcome. A
//! directed leg instead collects all of it: the other legs keep their baseline
//! stakes, and the marked leg is resized so its payout covers the best payout
//! any frozen leg could produce.
//!
//! ```text
//! baseline: A 100 @ 2.10, B 105 @ 2.00, B marked
//! frozen:   A returns 210
//! marked:   210 - 100 = 110          (B now returns 220)
//! ```

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surebet_core::{checked_sum, Rounding};
use tracing::{debug, trace};

use crate::types::StakeSnapshot;

/// Request to steer all profit into one leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectedProfit {
    /// Zero-based indices of the marked legs. Exactly one is supported.
    pub marked_legs: Vec<usize>,
    /// Stakes captured from the equalization pass the request started from.
    pub baseline: StakeSnapshot,
}

impl DirectedProfit {
    /// Marks a single leg against a baseline.
    #[must_use]
    pub fn new(marked_leg: usize, baseline: StakeSnapshot) -> Self {
        Self {
            marked_legs: vec![marked_leg],
            baseline,
        }
    }

    /// Returns the marked leg when exactly one distinct leg is marked.
    #[must_use]
    pub fn single_marked(&self) -> Option<usize> {
        let distinct: BTreeSet<usize> = self.marked_legs.iter().copied().collect();
        if distinct.len() == 1 {
            distinct.into_iter().next()
        } else {
            None
        }
    }
}

/// Recomputes the marked leg's stake so it collects all the profit.
///
/// Returns `None`, meaning "use the default equalized stakes", unless:
/// - `odds` and `base_stakes` have the same length
/// - exactly one leg is marked and the marked count is strictly between
///   zero and the leg count
/// - every unmarked baseline stake is positive
///
/// The baseline must come from an immutable snapshot, never from stakes a
/// previous call already adjusted.
#[must_use]
pub fn redirect(
    odds: &[Decimal],
    base_stakes: &[Decimal],
    marked: &[usize],
    rounding: Rounding,
) -> Option<Vec<Decimal>> {
    let n = odds.len();
    if n != base_stakes.len() {
        debug!(odds = n, stakes = base_stakes.len(), "Directed profit: length mismatch");
        return None;
    }

    let marked: BTreeSet<usize> = marked.iter().copied().collect();
    if marked.is_empty() || marked.len() >= n {
        return None;
    }
    if marked.len() != 1 {
        debug!(marked = marked.len(), "Directed profit supports a single marked leg");
        return None;
    }
    let marked_idx = *marked.iter().next()?;
    if marked_idx >= n {
        return None;
    }

    let unmarked = (0..n).filter(|i| *i != marked_idx);
    if unmarked.clone().any(|i| base_stakes[i] <= Decimal::ZERO) {
        debug!("Directed profit: unmarked leg without baseline stake");
        return None;
    }

    let returns: Option<Vec<Decimal>> = unmarked
        .clone()
        .map(|i| base_stakes[i].checked_mul(odds[i]))
        .collect();
    let (Some(target_return), Some(frozen_total)) = (
        returns.and_then(|r| r.into_iter().max()),
        checked_sum(unmarked.map(|i| base_stakes[i])),
    ) else {
        debug!("Directed profit: baseline return overflows");
        return None;
    };
    let marked_stake = rounding.apply((target_return - frozen_total).max(Decimal::ZERO));

    trace!(
        marked = marked_idx,
        target_return = %target_return,
        frozen_total = %frozen_total,
        marked_stake = %marked_stake,
        "Directed profit stake computed"
    );

    let mut stakes = base_stakes.to_vec();
    stakes[marked_idx] = marked_stake;
    Some(stakes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // ==================== Success Tests ====================

    #[test]
    fn test_two_leg_redirect() {
        let odds = [dec!(2.10), dec!(2.00)];
        let base = [dec!(100), dec!(105)];

        let stakes = redirect(&odds, &base, &[1], Rounding::Cents).unwrap();
        assert_eq!(stakes, vec![dec!(100), dec!(110)]);
    }

    #[test]
    fn test_target_is_max_frozen_return() {
        let odds = [dec!(3.00), dec!(3.20), dec!(4.00)];
        let base = [dec!(100), dec!(90), dec!(75)];

        // Frozen returns: 300, 288 -> target 300, frozen total 190
        let stakes = redirect(&odds, &base, &[2], Rounding::Exact).unwrap();
        assert_eq!(stakes, vec![dec!(100), dec!(90), dec!(110)]);
    }

    #[test]
    fn test_marked_stake_never_negative() {
        let odds = [dec!(1.10), dec!(5.00)];
        let base = [dec!(100), dec!(20)];

        // Target 110, frozen total 100
        let stakes = redirect(&odds, &base, &[1], Rounding::Exact).unwrap();
        assert_eq!(stakes[1], dec!(10));

        // Target 105, frozen total 200
        let odds = [dec!(1.05), dec!(1.05), dec!(5.00)];
        let base = [dec!(100), dec!(100), dec!(20)];
        let stakes = redirect(&odds, &base, &[2], Rounding::Exact).unwrap();
        assert_eq!(stakes[2], Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_marks_count_once() {
        let odds = [dec!(2.10), dec!(2.00)];
        let base = [dec!(100), dec!(105)];
        assert!(redirect(&odds, &base, &[1, 1], Rounding::Cents).is_some());
    }

    #[test]
    fn test_repeated_calls_are_idempotent() {
        let odds = [dec!(2.10), dec!(2.00)];
        let base = [dec!(100), dec!(105)];

        let first = redirect(&odds, &base, &[1], Rounding::Cents).unwrap();
        let second = redirect(&odds, &base, &[1], Rounding::Cents).unwrap();
        assert_eq!(first, second);
    }

    // ==================== Fallback Tests ====================

    #[test]
    fn test_no_marks_or_all_marked() {
        let odds = [dec!(2.10), dec!(2.00)];
        let base = [dec!(100), dec!(105)];

        assert!(redirect(&odds, &base, &[], Rounding::Cents).is_none());
        assert!(redirect(&odds, &base, &[0, 1], Rounding::Cents).is_none());
    }

    #[test]
    fn test_multiple_marks_not_supported() {
        let odds = [dec!(3.0), dec!(3.0), dec!(3.0)];
        let base = [dec!(100), dec!(100), dec!(100)];
        assert!(redirect(&odds, &base, &[0, 1], Rounding::Cents).is_none());
    }

    #[test]
    fn test_out_of_range_mark() {
        let odds = [dec!(2.10), dec!(2.00)];
        let base = [dec!(100), dec!(105)];
        assert!(redirect(&odds, &base, &[5], Rounding::Cents).is_none());
    }

    #[test]
    fn test_unmarked_leg_without_stake() {
        let odds = [dec!(2.10), dec!(2.00)];
        let base = [Decimal::ZERO, dec!(105)];
        assert!(redirect(&odds, &base, &[1], Rounding::Cents).is_none());
    }

    #[test]
    fn test_overflowing_baseline_return() {
        let odds = [dec!(2.10), dec!(2.00)];
        let base = [dec!(50000000000000000000000000000), dec!(105)];
        assert!(redirect(&odds, &base, &[1], Rounding::Cents).is_none());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(redirect(&[dec!(2)], &[dec!(1), dec!(1)], &[0], Rounding::Cents).is_none());
    }

    // ==================== DirectedProfit Tests ====================

    #[test]
    fn test_single_marked() {
        let baseline = StakeSnapshot::new(vec![dec!(1), dec!(2)]);
        assert_eq!(DirectedProfit::new(1, baseline.clone()).single_marked(), Some(1));

        let many = DirectedProfit {
            marked_legs: vec![0, 1],
            baseline,
        };
        assert_eq!(many.single_marked(), None);
    }
}
