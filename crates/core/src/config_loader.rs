use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Default location of the TOML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

/// Prefix for environment overrides, e.g. `SUREBET_ENGINE__EXPECTED_LEGS=3`.
pub const ENV_PREFIX: &str = "SUREBET_";

pub struct ConfigLoader;

impl ConfigLoader {
    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    /// Loads application configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Toml::file(DEFAULT_CONFIG_PATH))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Ok(config)
    }

    /// Loads application configuration from an explicit TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: AppConfig = Self::base()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Loads application configuration with a specific profile.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Toml::file(DEFAULT_CONFIG_PATH))
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Ok(config)
    }
}
