//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/billsplit.toml

use crate::domain::types::TipMode;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/billsplit.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Prefix printed in front of every amount
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Print the intermediate allocation quantities under the table
    #[serde(default)]
    pub show_breakdown: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { currency_symbol: default_currency_symbol(), show_breakdown: false }
    }
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    /// Tip mode used when none is given on the command line
    #[serde(default)]
    pub tip_mode: TipMode,
    #[serde(default = "default_adults")]
    pub adults: usize,
    #[serde(default)]
    pub minors: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { tip_mode: TipMode::default(), adults: default_adults(), minors: 0 }
    }
}

fn default_adults() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON log lines instead of the human-readable format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    currency_symbol: String,
    show_breakdown: bool,
    default_tip_mode: TipMode,
    default_adults: usize,
    default_minors: usize,
    log_level: String,
    log_json: bool,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default".to_string())
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        Self {
            currency_symbol: toml_config.display.currency_symbol,
            show_breakdown: toml_config.display.show_breakdown,
            default_tip_mode: toml_config.defaults.tip_mode,
            default_adults: toml_config.defaults.adults,
            default_minors: toml_config.defaults.minors,
            log_level: toml_config.logging.level,
            log_json: toml_config.logging.json,
            config_file,
        }
    }

    /// Determine config file path from the command line or environment
    pub fn resolve_config_path(explicit: Option<&str>) -> String {
        if let Some(path) = explicit {
            return path.to_string();
        }

        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        DEFAULT_CONFIG_PATH.to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if toml_config.defaults.adults == 0 {
            anyhow::bail!(
                "Invalid config file {}: defaults.adults must be at least 1",
                path.display()
            );
        }

        Ok(Self::from_toml(toml_config, path.display().to_string()))
    }

    /// Load configuration - tries TOML file first, falls back to defaults.
    ///
    /// Runs before logging is initialised, so the warning goes to stderr.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {:#}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Resolve the path and load it
    pub fn load(explicit: Option<&str>) -> Self {
        Self::load_from_path(Self::resolve_config_path(explicit))
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn show_breakdown(&self) -> bool {
        self.show_breakdown
    }

    pub fn default_tip_mode(&self) -> TipMode {
        self.default_tip_mode
    }

    pub fn default_adults(&self) -> usize {
        self.default_adults
    }

    pub fn default_minors(&self) -> usize {
        self.default_minors
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn log_json(&self) -> bool {
        self.log_json
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to change the currency symbol
    #[cfg(test)]
    pub fn with_currency_symbol(mut self, symbol: &str) -> Self {
        self.currency_symbol = symbol.to_string();
        self
    }
}
