//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. NIGHT_AUDIT_CONFIG environment variable
//! 3. Default: config/default.toml
//!
//! A missing or unreadable file falls back to built-in defaults.

use crate::pricing::PricingRules;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CONFIG_ENV_VAR: &str = "NIGHT_AUDIT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyConfig {
    /// Opaque id scoping the history tables
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_hotel_name")]
    pub hotel_name: String,
    /// Shown verbatim in front of amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for PropertyConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            hotel_name: default_hotel_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_user_id() -> String {
    "default".to_string()
}

fn default_hotel_name() -> String {
    "Hotel".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/night_audit.db")
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub property: PropertyConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pricing: PricingRules,
}

impl Config {
    /// Pick the config file: explicit path, then env var, then the default path
    pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the resolved path, falling back to defaults
    ///
    /// An explicitly requested file that fails to load is an error; the
    /// env/default locations are optional.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = Self::resolve_config_path(explicit);

        match Self::from_file(&path) {
            Ok(config) => Ok(config),
            Err(e) if explicit.is_some() => Err(e),
            Err(e) => {
                warn!("{:#}. Using defaults.", e);
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        let p = &self.pricing;
        anyhow::ensure!(
            (0.0..=1.0).contains(&p.low_occupancy_below)
                && (0.0..=1.0).contains(&p.high_occupancy_above),
            "pricing occupancy thresholds must be between 0 and 1"
        );
        anyhow::ensure!(
            p.low_occupancy_below <= p.high_occupancy_above,
            "low_occupancy_below must not exceed high_occupancy_above"
        );
        anyhow::ensure!(
            p.low_inventory_below <= p.high_inventory_above,
            "low_inventory_below must not exceed high_inventory_above"
        );
        anyhow::ensure!(
            p.single_tier > 0.0 && p.double_tier > 0.0,
            "room tier factors must be positive"
        );
        Ok(())
    }

    pub fn currency_symbol(&self) -> &str {
        &self.property.currency_symbol
    }

    pub fn user_id(&self) -> &str {
        &self.property.user_id
    }

    pub fn database_path(&self) -> &Path {
        &self.database.path
    }
}
