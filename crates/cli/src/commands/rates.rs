//! Rates CLI command.
//!
//! Prints the BRL table the calculator would use, with the tier each rate
//! came from (manual > ptax > fallback).

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;
use surebet_core::{AppConfig, BrlRates, Currency};

use super::parse_rate_override;

/// Arguments for the rates command.
#[derive(Args, Debug, Clone)]
pub struct RatesArgs {
    /// Extra manual rate, e.g. --rate USD=5.31 (repeatable)
    #[arg(long = "rate", value_parser = parse_rate_override)]
    pub rates: Vec<(Currency, Decimal)>,

    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_rates(config: &AppConfig, args: &RatesArgs) -> Result<()> {
    let overrides: BrlRates = args.rates.iter().cloned().collect();
    let resolved = config
        .rates
        .resolver()
        .with_manual_overrides(&overrides)
        .resolve_detailed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    println!("{:<8} {:>12}  {}", "Currency", "BRL/unit", "Source");
    println!("───────────────────────────────────");
    for r in &resolved {
        println!("{:<8} {:>12.4}  {}", r.currency, r.rate, r.source);
    }
    if resolved.is_empty() {
        println!("(no rates configured)");
    }

    Ok(())
}
