//! Convert CLI command.

use anyhow::{bail, Result};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use surebet_core::{convert_detailed, convert_strict, AppConfig, BrlRates, Currency};
use tracing::warn;

use super::parse_rate_override;

/// Arguments for the convert command.
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Amount to convert
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Decimal,

    /// Source currency
    #[arg(long)]
    pub from: Currency,

    /// Target currency
    #[arg(long)]
    pub to: Currency,

    /// Extra manual rate, e.g. --rate USD=5.31 (repeatable)
    #[arg(long = "rate", value_parser = parse_rate_override)]
    pub rates: Vec<(Currency, Decimal)>,

    /// Fail instead of substituting 1 for a missing rate
    #[arg(long)]
    pub strict: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ConvertOutput<'a> {
    amount: Decimal,
    from: &'a Currency,
    to: &'a Currency,
    converted: Decimal,
    degraded: bool,
}

pub fn run_convert(config: &AppConfig, args: &ConvertArgs) -> Result<()> {
    let overrides: BrlRates = args.rates.iter().cloned().collect();
    let rates = config
        .rates
        .resolver()
        .with_manual_overrides(&overrides)
        .resolve([&args.from, &args.to]);

    let (converted, degraded) = if args.strict {
        (convert_strict(args.amount, &args.from, &args.to, &rates)?, false)
    } else {
        let conversion = convert_detailed(args.amount, &args.from, &args.to, &rates);
        for w in &conversion.warnings {
            warn!("{}", w);
        }
        let Some(amount) = conversion.checked() else {
            bail!("Converting {} {} to {} overflows", args.amount, args.from, args.to);
        };
        (amount, conversion.is_degraded())
    };

    if args.json {
        let output = ConvertOutput {
            amount: args.amount,
            from: &args.from,
            to: &args.to,
            converted,
            degraded,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{:.2} {} = {:.2} {}",
            args.amount, args.from, converted, args.to
        );
        if degraded {
            eprintln!("⚠️  A rate was missing and replaced by 1; the result is an estimate.");
        }
    }

    Ok(())
}
