//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::{CliConfig, StoreKind};

/// Inspect and edit a persisted shopping cart.
#[derive(Debug, Parser)]
#[command(name = "basket", version, about)]
pub struct Cli {
    /// Persistence backend [env: BASKET_STORE]
    #[arg(long, value_enum, global = true)]
    pub store: Option<StoreKind>,

    /// Data directory for the file and SQLite backends [env: BASKET_DATA_DIR]
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Cart id to operate on [env: BASKET_CART_ID]
    #[arg(long = "cart", short = 'c', global = true)]
    pub cart_id: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Applies flag overrides on top of the environment configuration.
    pub fn apply_overrides(&self, config: &mut CliConfig) {
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(id) = &self.cart_id {
            config.cart_id = id.clone();
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add an item (merged into an existing line with the same identity)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value_t = 0.0)]
        tax: f64,
        #[arg(long, short = 'q', default_value_t = 1)]
        quantity: i64,
        /// Custom attribute, `key=value`; values are read as JSON, else as text
        #[arg(long = "attr", short = 'a', value_parser = parse_key_value)]
        attributes: Vec<(String, Value)>,
    },

    /// Remove the line with this identity (or unique identity prefix)
    Remove { identity: String },

    /// Set one attribute of a line
    Update {
        identity: String,
        key: String,
        /// Read as JSON, else as text
        value: String,
    },

    /// Set a line's quantity; zero or less removes it
    Qty {
        identity: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// List the cart's lines and totals
    Show,

    /// Print the cart summary as JSON
    Summary,

    /// Print the persisted blob
    Json {
        #[arg(long)]
        pretty: bool,
    },

    /// Empty the cart and delete its stored blob
    Clear,

    /// Copy the cart to a new id in the same store
    Copy { new_id: String },

    /// Add every line of another cart into this one
    Merge { other_id: String },
}

/// Reads a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("attribute key is empty in {raw:?}"));
    }
    Ok((key.to_string(), parse_value(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("3"), json!(3));
        assert_eq!(parse_value("2.5"), json!(2.5));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("\"M\""), json!("M"));
        assert_eq!(parse_value("M"), json!("M"));
        assert_eq!(parse_value("{\"a\":1}"), json!({"a": 1}));
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("size=M").unwrap(), ("size".to_string(), json!("M")));
        assert_eq!(parse_key_value("weight=1.5").unwrap(), ("weight".to_string(), json!(1.5)));
        assert!(parse_key_value("size").is_err());
        assert!(parse_key_value("=M").is_err());
    }

    #[test]
    fn test_parse_add_with_flags() {
        let cli = Cli::try_parse_from([
            "basket", "--store", "memory", "-c", "c1", "add", "--name", "Shirt", "--price", "25",
            "-a", "size=M",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(StoreKind::Memory));
        assert_eq!(cli.cart_id.as_deref(), Some("c1"));
        match cli.command {
            Command::Add { name, price, tax, quantity, attributes } => {
                assert_eq!(name, "Shirt");
                assert_eq!(price, 25.0);
                assert_eq!(tax, 0.0);
                assert_eq!(quantity, 1);
                assert_eq!(attributes, vec![("size".to_string(), json!("M"))]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_qty_accepts_negative() {
        let cli = Cli::try_parse_from(["basket", "qty", "abc", "-1"]).unwrap();
        assert!(matches!(cli.command, Command::Qty { quantity: -1, .. }));
    }
}
