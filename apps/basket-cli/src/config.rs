//! # CLI Configuration
//!
//! Loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags
//! 2. Environment variables (`BASKET_*`)
//! 3. Defaults (this file)

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use basket_core::{MemoryStore, Store};
use basket_store::{FileStore, SqliteStore};
use clap::ValueEnum;
use directories::ProjectDirs;
use tracing::info;

use crate::error::CliResult;

/// SQLite database file name inside the data directory.
pub const SQLITE_FILE: &str = "basket.db";

/// Directory for the file backend inside the data directory.
pub const CARTS_DIR: &str = "carts";

/// Which backend carts are persisted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// One JSON file per cart.
    #[default]
    File,
    /// A `cart_blobs` table in SQLite.
    Sqlite,
    /// Nothing survives the process.
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreKind::File),
            "sqlite" => Ok(StoreKind::Sqlite),
            "memory" => Ok(StoreKind::Memory),
            _ => Err(ConfigError::InvalidValue("BASKET_STORE".to_string())),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreKind::File => "file",
            StoreKind::Sqlite => "sqlite",
            StoreKind::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Persistence backend.
    /// Default: file
    pub store: StoreKind,

    /// Where the file and SQLite backends keep their data.
    /// Default: the platform data directory
    pub data_dir: PathBuf,

    /// Cart the command operates on.
    /// Default: "default"
    pub cart_id: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for amounts
    pub currency_decimals: u8,
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the process
    /// environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("BASKET_STORE") {
            Some(value) => value.parse()?,
            None => StoreKind::default(),
        };

        let data_dir = match lookup("BASKET_DATA_DIR") {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };

        let cart_id = lookup("BASKET_CART_ID")
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| "default".to_string());

        let currency_symbol = lookup("BASKET_CURRENCY_SYMBOL").unwrap_or_else(|| "$".to_string());

        let currency_decimals: u8 = lookup("BASKET_CURRENCY_DECIMALS")
            .unwrap_or_else(|| "2".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BASKET_CURRENCY_DECIMALS".to_string()))?;
        if currency_decimals > 8 {
            return Err(ConfigError::InvalidValue(
                "BASKET_CURRENCY_DECIMALS".to_string(),
            ));
        }

        Ok(CliConfig {
            store,
            data_dir,
            cart_id,
            currency_symbol,
            currency_decimals,
        })
    }

    /// Formats an amount for display.
    ///
    /// ## Example
    /// ```rust,ignore
    /// assert_eq!(config.format_amount(12.5), "$12.50");
    /// ```
    pub fn format_amount(&self, amount: f64) -> String {
        let digits = format!("{:.*}", self.currency_decimals as usize, amount.abs());
        let is_zero = digits.chars().all(|c| c == '0' || c == '.');
        let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
        format!("{sign}{}{digits}", self.currency_symbol)
    }

    /// Opens the configured backend.
    pub fn open_store(&self) -> CliResult<Arc<dyn Store>> {
        info!(store = %self.store, data_dir = %self.data_dir.display(), "Opening cart store");

        let store: Arc<dyn Store> = match self.store {
            StoreKind::File => Arc::new(FileStore::open(self.data_dir.join(CARTS_DIR))?),
            StoreKind::Sqlite => {
                std::fs::create_dir_all(&self.data_dir).map_err(|e| {
                    ConfigError::InvalidValue(format!(
                        "BASKET_DATA_DIR ({}): {e}",
                        self.data_dir.display()
                    ))
                })?;
                Arc::new(SqliteStore::open_path(self.data_dir.join(SQLITE_FILE))?)
            }
            StoreKind::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

/// Platform-specific data directory.
///
/// - **macOS**: `~/Library/Application Support/com.basket.basket`
/// - **Windows**: `%APPDATA%\basket\basket\data`
/// - **Linux**: `~/.local/share/basket`
fn default_data_dir() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("com", "basket", "basket")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ConfigError::MissingRequired("BASKET_DATA_DIR".to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("BASKET_DATA_DIR", "/tmp/basket")]).unwrap();
        assert_eq!(config.store, StoreKind::File);
        assert_eq!(config.cart_id, "default");
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.currency_decimals, 2);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/basket"));
    }

    #[test]
    fn test_environment_overrides() {
        let config = config_from(&[
            ("BASKET_STORE", "SQLite"),
            ("BASKET_DATA_DIR", "/data"),
            ("BASKET_CART_ID", "checkout-7"),
            ("BASKET_CURRENCY_SYMBOL", "€"),
            ("BASKET_CURRENCY_DECIMALS", "3"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.cart_id, "checkout-7");
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.currency_decimals, 3);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("BASKET_DATA_DIR", "/d"), ("BASKET_STORE", "redis")]),
            Err(ConfigError::InvalidValue(ref key)) if key == "BASKET_STORE"
        ));
        assert!(matches!(
            config_from(&[("BASKET_DATA_DIR", "/d"), ("BASKET_CURRENCY_DECIMALS", "two")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(config_from(&[("BASKET_DATA_DIR", "/d"), ("BASKET_CURRENCY_DECIMALS", "12")]).is_err());
    }

    #[test]
    fn test_format_amount() {
        let config = config_from(&[("BASKET_DATA_DIR", "/d")]).unwrap();
        assert_eq!(config.format_amount(12.34), "$12.34");
        assert_eq!(config.format_amount(1.0), "$1.00");
        assert_eq!(config.format_amount(0.0), "$0.00");
        assert_eq!(config.format_amount(-12.34), "-$12.34");
        assert_eq!(config.format_amount(-0.001), "$0.00");
    }

    #[test]
    fn test_format_amount_without_decimals() {
        let mut config = config_from(&[("BASKET_DATA_DIR", "/d")]).unwrap();
        config.currency_symbol = "¥".to_string();
        config.currency_decimals = 0;
        assert_eq!(config.format_amount(1234.0), "¥1234");
    }

    #[test]
    fn test_open_file_store_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_from(&[("BASKET_DATA_DIR", dir.path().to_str().unwrap())]).unwrap();

        let store = config.open_store().unwrap();
        store.put("c1", "{}").unwrap();
        assert!(dir.path().join(CARTS_DIR).join("c1.json").exists());
    }
}
