//! Calc CLI command.
//!
//! Reads an operation file, resolves the rate table it needs, runs one
//! calculation pass and prints the analysis.
//!
//! ```toml
//! consolidation_currency = "USD"
//!
//! [rates]
//! USD = 5.50
//! EUR = 6.00
//!
//! [[legs]]
//! currency = "USD"
//! stake = 100
//! odd = 1.95
//! role = "reference"
//!
//! [[legs]]
//! currency = "EUR"
//! odd = 2.05
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use figment::{
    providers::{Format, Json, Toml},
    Figment,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use surebet_core::{AppConfig, BrlRates, Currency, Rounding};
use surebet_engine::{
    AnalysisFormatter, DirectedProfit, Leg, LegEntry, Operation, StakeRole, StakeSource,
    SurebetCalculator,
};
use tracing::{info, warn};

use super::parse_rate_override;

/// Arguments for the calc command.
#[derive(Args, Debug, Clone)]
pub struct CalcArgs {
    /// Operation file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Steer all profit into this leg (1-based)
    #[arg(long)]
    pub directed: Option<usize>,

    /// Extra manual rate, e.g. --rate USD=5.31 (repeatable)
    #[arg(long = "rate", value_parser = parse_rate_override)]
    pub rates: Vec<(Currency, Decimal)>,

    /// Reject operations that break the structural rules
    #[arg(long)]
    pub strict: bool,

    /// Print the calculation as JSON
    #[arg(long)]
    pub json: bool,
}

// =============================================================================
// Operation File
// =============================================================================

/// One leg as written in an operation file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegInput {
    pub currency: Option<Currency>,
    pub stake: Decimal,
    pub odd: Decimal,
    pub role: StakeRole,
    /// Split-bet entries; when present they replace `stake` and `odd`.
    pub entries: Vec<LegEntry>,
}

impl LegInput {
    fn into_leg(self) -> Leg {
        if self.entries.is_empty() {
            return Leg {
                currency: self.currency,
                stake: self.stake,
                odd: self.odd,
                role: self.role,
            };
        }

        let mut leg = Leg::from_entries(Currency::brl(), &self.entries, self.role);
        leg.currency = self.currency;
        leg
    }
}

/// An operation file: the legs plus per-operation overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OperationFile {
    pub consolidation_currency: Option<Currency>,
    pub expected_legs: Option<usize>,
    pub rounding: Option<Rounding>,
    /// Manual rates that win over every configured tier.
    pub rates: BrlRates,
    pub legs: Vec<LegInput>,
}

impl OperationFile {
    /// Reads an operation file, picking the format from the extension.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Operation file not found: {}", path.display());
        }

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let figment = if is_json {
            Figment::from(Json::file(path))
        } else {
            Figment::from(Toml::file(path))
        };

        figment
            .extract()
            .with_context(|| format!("Failed to parse operation file {}", path.display()))
    }

    /// Applies the file's overrides on top of the loaded config.
    #[must_use]
    pub fn apply_to(&self, config: &AppConfig) -> AppConfig {
        let mut config = config.clone();
        if let Some(currency) = &self.consolidation_currency {
            config.engine.consolidation_currency = currency.clone();
        }
        if let Some(expected) = self.expected_legs {
            config.engine.expected_legs = expected;
        }
        if let Some(rounding) = self.rounding {
            config.engine.rounding = rounding;
        }
        config
    }

    /// Converts the file legs into engine legs.
    #[must_use]
    pub fn legs(&self) -> Vec<Leg> {
        self.legs.iter().cloned().map(LegInput::into_leg).collect()
    }
}

// =============================================================================
// Command
// =============================================================================

pub fn run_calc(config: &AppConfig, args: &CalcArgs) -> Result<()> {
    let operation = OperationFile::load(&args.input)?;
    let config = operation.apply_to(config);
    let legs = operation.legs();

    if args.strict {
        Operation::new(legs.clone(), config.engine.expected_legs).validate()?;
    }

    let mut overrides = operation.rates.clone();
    for (currency, rate) in &args.rates {
        overrides.insert(currency.clone(), *rate);
    }
    let resolver = config.rates.resolver().with_manual_overrides(&overrides);

    let consolidation = &config.engine.consolidation_currency;
    let currencies: BTreeSet<&Currency> = legs
        .iter()
        .filter_map(|l| l.currency.as_ref())
        .chain(std::iter::once(consolidation))
        .collect();
    let brl_rates = resolver.resolve(currencies);

    let calculator = SurebetCalculator::from_config(&config, brl_rates);

    let directed = match args.directed {
        Some(0) => bail!("--directed takes a 1-based leg number"),
        Some(n) if n > legs.len() => {
            bail!("--directed {} is out of range for {} legs", n, legs.len())
        }
        Some(n) => Some(DirectedProfit::new(n - 1, calculator.snapshot(&legs))),
        None => None,
    };

    let calculation = calculator.calculate(&legs, directed.as_ref());
    if directed.is_some() && calculation.source != StakeSource::Directed {
        warn!("Directed profit not applicable, showing {} stakes", calculation.source);
    }
    info!("{}", AnalysisFormatter::summary_line(&calculation.analysis));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&calculation)?);
    } else {
        print!("{}", AnalysisFormatter::format_calculation(&calculation, &legs));
    }

    Ok(())
}
