//! Currency and configuration primitives for surebet operations.
//!
//! - [`arith`]: overflow-aware Decimal helpers
//! - [`currency`]: currency codes, the BRL pivot rate table and conversion
//! - [`rates`]: manual > PTAX > fallback rate precedence
//! - [`rounding`]: stake rounding policies
//! - [`config`] / [`config_loader`]: application settings

pub mod arith;
pub mod config;
pub mod config_loader;
pub mod currency;
pub mod error;
pub mod rates;
pub mod rounding;

pub use arith::{checked_scale, checked_sum, saturated, saturating_sum};
pub use config::{AppConfig, EngineSettings, RateSettings};
pub use config_loader::ConfigLoader;
pub use currency::{
    convert, convert_detailed, convert_strict, BrlRates, Conversion, Currency, MissingRateWarning,
    RateLookup,
};
pub use error::{CurrencyError, RateError};
pub use rates::{default_fallback_rates, RateResolver, RateSource, ResolvedRate};
pub use rounding::Rounding;
