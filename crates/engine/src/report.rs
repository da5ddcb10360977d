#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

use rust_decimal::Decimal;

use crate::calculator::Calculation;
use crate::leg::Leg;
use crate::scenario::Analysis;

const RULE_HEAVY: &str = "═══════════════════════════════════════════════════════════════\n";
const RULE_LIGHT: &str = "───────────────────────────────────────────────────────────────\n";

/// Plain-text report of an analysis.
pub struct AnalysisFormatter;

impl AnalysisFormatter {
    #[must_use]
    pub fn format(analysis: &Analysis, legs: &[Leg]) -> String {
        let mut output = String::new();
        let display = &analysis.display_currency;

        output.push('\n');
        output.push_str(RULE_HEAVY);
        output.push_str("                    SUREBET ANALYSIS                           \n");
        output.push_str(RULE_HEAVY);
        output.push('\n');

        // Legs
        output.push_str("Legs\n");
        output.push_str(RULE_LIGHT);
        for (i, leg) in legs.iter().enumerate() {
            let stake = analysis.stakes_local.get(i).copied().unwrap_or(leg.stake);
            let currency = leg.currency_or(&analysis.consolidation_currency);
            output.push_str(&format!(
                "#{:<3} {:>12.2} {:<5} @ {:<8} {}\n",
                i + 1,
                stake,
                currency,
                leg.odd,
                leg.role
            ));
        }
        output.push('\n');

        // Scenarios
        output.push_str("Scenarios\n");
        output.push_str(RULE_LIGHT);
        for s in &analysis.scenarios {
            let marker = if s.is_positive { "+" } else { "-" };
            output.push_str(&format!(
                "{} leg #{:<3} payout {:>12.2} {}  profit {:>10.2} {}  ROI {:>7.2}%\n",
                marker,
                s.leg_index + 1,
                s.payout_consolidated,
                analysis.consolidation_currency,
                s.profit,
                analysis.consolidation_currency,
                s.roi
            ));
        }
        output.push('\n');

        // Totals
        output.push_str("Totals\n");
        output.push_str(RULE_LIGHT);
        output.push_str(&format!(
            "Total Stake:           {:.2} {}\n",
            analysis.stake_total, analysis.consolidation_currency
        ));
        output.push_str(&format!(
            "Profit Range:          {:.2} .. {:.2} {}\n",
            analysis.min_profit, analysis.max_profit, analysis.consolidation_currency
        ));
        output.push_str(&format!(
            "ROI Range:             {:.2}% .. {:.2}%\n",
            analysis.min_roi, analysis.max_roi
        ));
        output.push_str(&format!(
            "Display Currency:      {}\n",
            display
        ));
        output.push_str(&format!(
            "Complete Legs:         {}\n",
            analysis.complete_legs
        ));
        output.push_str(&format!(
            "Arbitrage:             {}\n",
            if analysis.is_valid_arbitrage { "YES" } else { "NO" }
        ));
        output.push('\n');
        output.push_str(RULE_HEAVY);

        if analysis.is_partial {
            output.push_str("\n⚠️  Operation is partial: not every expected leg is complete.\n");
        }
        for w in &analysis.rate_warnings {
            output.push_str(&format!("\n⚠️  {}\n", w));
        }
        if analysis.scenarios.is_empty() {
            output.push_str("\n⚠️  No legs to analyze.\n");
        }

        output
    }

    /// Formats a calculation, noting which path produced the stakes.
    #[must_use]
    pub fn format_calculation(calculation: &Calculation, legs: &[Leg]) -> String {
        let mut output = Self::format(&calculation.analysis, legs);
        output.push_str(&format!("\nStakes: {}\n", calculation.source));
        output
    }

    /// One-line summary for logs.
    #[must_use]
    pub fn summary_line(analysis: &Analysis) -> String {
        let verdict = if analysis.is_valid_arbitrage {
            "arbitrage"
        } else if analysis.min_profit < Decimal::ZERO {
            "losing"
        } else {
            "incomplete"
        };
        format!(
            "{} legs, total {:.2} {}, min profit {:.2} ({:.2}%): {}",
            analysis.scenarios.len(),
            analysis.stake_total,
            analysis.consolidation_currency,
            analysis.min_profit,
            analysis.min_roi,
            verdict
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::SurebetCalculator;
    use crate::types::EngineConfig;
    use rust_decimal_macros::dec;
    use surebet_core::{BrlRates, Currency};

    fn brl_legs() -> Vec<Leg> {
        vec![
            Leg::reference(Currency::brl(), dec!(100), dec!(2.10)),
            Leg::new(Currency::brl(), Decimal::ZERO, dec!(2.00)),
        ]
    }

    // ==================== Format Tests ====================

    #[test]
    fn test_format_valid_arbitrage() {
        let legs = brl_legs();
        let calc = SurebetCalculator::new(EngineConfig::brl_only()).calculate(&legs, None);
        let text = AnalysisFormatter::format(&calc.analysis, &legs);

        assert!(text.contains("SUREBET ANALYSIS"));
        assert!(text.contains("Total Stake:           205.00 BRL"));
        assert!(text.contains("Arbitrage:             YES"));
        assert!(text.contains("reference"));
        assert!(!text.contains("partial"));
    }

    #[test]
    fn test_format_shows_rate_warnings() {
        let legs = vec![
            Leg::reference(Currency::usd(), dec!(100), dec!(2.10)),
            Leg::new(Currency::brl(), Decimal::ZERO, dec!(2.00)),
        ];
        let engine = EngineConfig::new(Currency::brl(), BrlRates::new());
        let calc = SurebetCalculator::new(engine).calculate(&legs, None);
        let text = AnalysisFormatter::format(&calc.analysis, &legs);

        assert!(text.contains("USD"));
        assert!(text.contains("⚠️"));
    }

    #[test]
    fn test_format_calculation_names_source() {
        let legs = brl_legs();
        let calc = SurebetCalculator::new(EngineConfig::brl_only()).calculate(&legs, None);
        let text = AnalysisFormatter::format_calculation(&calc, &legs);
        assert!(text.contains("Stakes: equalized"));
    }

    // ==================== Summary Tests ====================

    #[test]
    fn test_summary_line() {
        let legs = brl_legs();
        let calc = SurebetCalculator::new(EngineConfig::brl_only()).calculate(&legs, None);
        let line = AnalysisFormatter::summary_line(&calc.analysis);

        assert!(line.starts_with("2 legs, total 205.00 BRL"));
        assert!(line.ends_with("arbitrage"));
    }

    #[test]
    fn test_summary_line_losing() {
        let legs = vec![
            Leg::reference(Currency::brl(), dec!(100), dec!(1.80)),
            Leg::new(Currency::brl(), Decimal::ZERO, dec!(1.80)),
        ];
        let calc = SurebetCalculator::new(EngineConfig::brl_only()).calculate(&legs, None);
        assert!(AnalysisFormatter::summary_line(&calc.analysis).ends_with("losing"));
    }
}
