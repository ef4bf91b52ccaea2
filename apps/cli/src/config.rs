//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command Line (highest priority)                                    │
//! │     pharmacy --db ./shop.db inventory                                  │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     PHARMACY_DB_PATH=/srv/pharmacy.db                                  │
//! │     PHARMACY_LOW_STOCK_THRESHOLD=10                                    │
//! │     PHARMACY_CURRENCY_SYMBOL=VND                                       │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config PATH, or                                                  │
//! │     ~/.config/pharmacy/pharmacy.toml (Linux)                           │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     <platform data dir>/pharmacy.db, threshold 5, symbol "đ"           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pharmacy.toml
//! database_path = "/var/lib/pharmacy/pharmacy.db"
//! low_stock_threshold = 5
//! currency_symbol = "đ"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Longest accepted currency symbol, in characters.
pub const MAX_CURRENCY_SYMBOL_LENGTH: usize = 8;

/// Errors raised while building the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the platform data directory")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// App Config
// =============================================================================

/// Settings for one run of the `pharmacy` binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Quantity at or below which a batch is flagged low stock.
    pub low_stock_threshold: i64,

    /// Suffix used when printing amounts.
    pub currency_symbol: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: None,
            low_stock_threshold: pharmacy_core::DEFAULT_LOW_STOCK_THRESHOLD,
            currency_symbol: "đ".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the TOML file, then environment overrides.
    ///
    /// An explicit `config_path` must exist. The default location is
    /// optional.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                other => {
                    debug!(path = ?other, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "Config file loaded");
        Ok(config)
    }

    /// Applies `PHARMACY_*` overrides read through `lookup`.
    ///
    /// Taking the lookup as a closure keeps tests off the process
    /// environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("PHARMACY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("PHARMACY_LOW_STOCK_THRESHOLD") {
            self.low_stock_threshold = value.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "PHARMACY_LOW_STOCK_THRESHOLD must be an integer, got '{}'",
                    value
                ))
            })?;
        }

        if let Some(symbol) = lookup("PHARMACY_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(format!(
                "low_stock_threshold must be >= 0, got {}",
                self.low_stock_threshold
            )));
        }

        if self.currency_symbol.chars().count() > MAX_CURRENCY_SYMBOL_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "currency_symbol must be at most {} characters",
                MAX_CURRENCY_SYMBOL_LENGTH
            )));
        }

        Ok(())
    }

    /// Resolves the database file, creating the platform data directory
    /// when it is used.
    pub fn resolve_database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Read {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join("pharmacy.db"))
    }

    /// `pharmacy.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("pharmacy.toml"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "pharmacy", "pharmacy")
}

// =============================================================================
// Unit Tests
// =============================================================================
