//! # Commands
//!
//! Each command opens the configured cart, applies one change, and closes it.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  basket add --name Widget --price 10                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart::new(cart_id, store)  ← restore from the store                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart.add(item)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart.close()               ← save; errors reach the user              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Write;
use std::sync::Arc;

use basket_core::{Cart, CartError, CartItem, Store};
use tracing::{debug, warn};

use crate::cli::{parse_value, Command};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Identities are shown shortened to this many hex digits.
const SHORT_IDENTITY: usize = 12;

/// Runs one command against `store` and returns what to print.
pub fn run(config: &CliConfig, store: Arc<dyn Store>, command: Command) -> CliResult<String> {
    let mut cart = open(&config.cart_id, &store)?;

    let output = match command {
        Command::Add {
            name,
            price,
            tax,
            quantity,
            attributes,
        } => {
            let mut item = CartItem::new(name, price, tax, quantity).map_err(CartError::from)?;
            for (key, value) in attributes {
                item.set(key, value).map_err(CartError::from)?;
            }
            let identity = item.identity().to_string();
            cart.add(item);
            format!("added {}", short(&identity))
        }

        Command::Remove { identity } => {
            let identity = resolve(&cart, &identity)?;
            if !cart.has(&identity) {
                return Err(CartError::ItemNotFound(identity).into());
            }
            cart.remove(&identity);
            format!("removed {}", short(&identity))
        }

        Command::Update {
            identity,
            key,
            value,
        } => {
            let identity = resolve(&cart, &identity)?;
            cart.update(&identity, &key, parse_value(&value))?;
            format!("updated {}", short(&identity))
        }

        Command::Qty { identity, quantity } => {
            let identity = resolve(&cart, &identity)?;
            if !cart.has(&identity) {
                return Err(CartError::ItemNotFound(identity).into());
            }
            cart.update_quantity(&identity, quantity)?;
            if quantity > 0 {
                format!("{} quantity {quantity}", short(&identity))
            } else {
                format!("removed {}", short(&identity))
            }
        }

        Command::Show => render(config, &cart),

        Command::Summary => serde_json::to_string_pretty(&cart.summary()).map_err(CartError::from)?,

        Command::Json { pretty } => {
            let blob = cart.serialize();
            if pretty {
                blob.to_json_pretty()?
            } else {
                blob.to_json()?
            }
        }

        Command::Clear => {
            cart.clear()?;
            format!("cleared {}", cart.id())
        }

        Command::Copy { new_id } => {
            if new_id == cart.id() {
                return Err(CliError::InvalidArgument(format!(
                    "cannot copy cart {new_id} onto itself"
                )));
            }
            let copy = cart.copy(new_id);
            let message = format!(
                "copied {} items from {} to {}",
                copy.total_items(),
                cart.id(),
                copy.id()
            );
            copy.close()?;
            message
        }

        Command::Merge { other_id } => {
            if other_id == cart.id() {
                return Err(CliError::InvalidArgument(format!(
                    "cannot merge cart {other_id} into itself"
                )));
            }
            let other = open(&other_id, &store)?;
            cart.merge(&other);
            let message = format!(
                "merged {} lines from {} into {}",
                other.total_unique_items(),
                other.id(),
                cart.id()
            );
            other.close()?;
            message
        }
    };

    cart.close()?;
    Ok(output)
}

/// Opens a cart, warning about entries the restore had to skip.
fn open(cart_id: &str, store: &Arc<dyn Store>) -> CliResult<Cart> {
    let cart = Cart::new(cart_id, Arc::clone(store))?;
    let report = cart.last_restore();
    if report.skipped > 0 {
        warn!(
            cart_id,
            skipped = report.skipped,
            "Some stored items could not be read and were dropped"
        );
    }
    debug!(cart_id, lines = cart.total_unique_items(), "Opened cart");
    Ok(cart)
}

/// Expands a unique identity prefix to the full identity.
///
/// An unknown prefix is returned unchanged so the cart reports it as missing.
fn resolve(cart: &Cart, prefix: &str) -> CliResult<String> {
    if cart.has(prefix) {
        return Ok(prefix.to_string());
    }
    let matches = cart.filter(|item| item.identity().starts_with(prefix));
    match matches.as_slice() {
        [item] => Ok(item.identity().to_string()),
        [] => Ok(prefix.to_string()),
        many => Err(CliError::AmbiguousIdentity {
            prefix: prefix.to_string(),
            matches: many.len(),
        }),
    }
}

fn short(identity: &str) -> &str {
    identity.get(..SHORT_IDENTITY).unwrap_or(identity)
}

/// Human-readable listing of the cart.
fn render(config: &CliConfig, cart: &Cart) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "cart {} ({} items, {} unique)",
        cart.id(),
        cart.total_items(),
        cart.total_unique_items()
    );

    for item in cart.items() {
        let extras = item
            .custom_attributes()
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(text) => format!("{key}={text}"),
                other => format!("{key}={other}"),
            })
            .collect::<Vec<_>>()
            .join(" ");

        let _ = writeln!(
            out,
            "  {}  {} x{}  {} each  {}  {}",
            short(item.identity()),
            item.name(),
            item.quantity(),
            config.format_amount(item.single_price()),
            config.format_amount(item.total_price()),
            extras
        );
    }

    let _ = write!(
        out,
        "subtotal {}  tax {}  total {}",
        config.format_amount(cart.subtotal()),
        config.format_amount(cart.tax()),
        config.format_amount(cart.total())
    );

    out.lines().map(str::trim_end).collect::<Vec<_>>().join("\n")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreKind;
    use basket_core::MemoryStore;
    use serde_json::{json, Value};
    use std::path::PathBuf;

    fn config(cart_id: &str) -> CliConfig {
        CliConfig {
            store: StoreKind::Memory,
            data_dir: PathBuf::from("/unused"),
            cart_id: cart_id.to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
        }
    }

    fn add(name: &str, price: f64, quantity: i64) -> Command {
        Command::Add {
            name: name.to_string(),
            price,
            tax: 0.0,
            quantity,
            attributes: Vec::new(),
        }
    }

    fn reopen(store: &Arc<dyn Store>, id: &str) -> Cart {
        Cart::new(id, Arc::clone(store)).unwrap()
    }

    #[test]
    fn test_add_persists_between_commands() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cfg = config("c1");

        run(&cfg, store.clone(), add("Widget", 10.0, 1)).unwrap();
        run(&cfg, store.clone(), add("Widget", 10.0, 2)).unwrap();

        let cart = reopen(&store, "c1");
        assert_eq!(cart.total_unique_items(), 1);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_prefix_resolution_and_qty() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cfg = config("c1");
        run(&cfg, store.clone(), add("Widget", 10.0, 1)).unwrap();
        let identity = reopen(&store, "c1").first().unwrap().identity().to_string();

        let command = Command::Qty {
            identity: identity[..8].to_string(),
            quantity: 5,
        };
        run(&cfg, store.clone(), command).unwrap();
        assert_eq!(reopen(&store, "c1").total_items(), 5);

        let command = Command::Qty {
            identity: identity.clone(),
            quantity: 0,
        };
        run(&cfg, store.clone(), command).unwrap();
        assert!(reopen(&store, "c1").is_empty());
    }

    #[test]
    fn test_update_parses_json_values() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cfg = config("c1");
        run(&cfg, store.clone(), add("Shirt", 20.0, 1)).unwrap();
        let identity = reopen(&store, "c1").first().unwrap().identity().to_string();

        let command = Command::Update {
            identity,
            key: "price".to_string(),
            value: "12.5".to_string(),
        };
        run(&cfg, store.clone(), command).unwrap();

        let cart = reopen(&store, "c1");
        assert_eq!(cart.first().unwrap().price(), 12.5);
    }

    #[test]
    fn test_invalid_update_is_reported() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cfg = config("c1");
        run(&cfg, store.clone(), add("Shirt", 20.0, 1)).unwrap();
        let identity = reopen(&store, "c1").first().unwrap().identity().to_string();

        let command = Command::Update {
            identity,
            key: "price".to_string(),
            value: "-1".to_string(),
        };
        let err = run(&cfg, store.clone(), command).unwrap_err();
        assert!(matches!(err, CliError::Cart(CartError::InvalidItem(_))));
        assert_eq!(reopen(&store, "c1").first().unwrap().price(), 20.0);
    }

    #[test]
    fn test_remove_unknown_identity() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let err = run(
            &config("c1"),
            store,
            Command::Remove {
                identity: "ffff".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Cart(CartError::ItemNotFound(_))));
    }

    #[test]
    fn test_ambiguous_prefix() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cfg = config("c1");
        for i in 0..40 {
            run(&cfg, store.clone(), add(&format!("Item {i}"), 1.0, 1)).unwrap();
        }
        // 40 lines over 16 leading hex digits: some digit is shared.
        let ambiguous = (0..16).map(|d| format!("{d:x}")).find_map(|prefix| {
            match run(&cfg, store.clone(), Command::Remove { identity: prefix }) {
                Err(err @ CliError::AmbiguousIdentity { .. }) => Some(err),
                _ => None,
            }
        });
        assert!(ambiguous.is_some());
    }

    #[test]
    fn test_copy_and_merge() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        run(&config("a"), store.clone(), add("A", 1.0, 1)).unwrap();
        run(&config("b"), store.clone(), add("B", 2.0, 2)).unwrap();

        run(
            &config("a"),
            store.clone(),
            Command::Copy {
                new_id: "a2".to_string(),
            },
        )
        .unwrap();
        run(
            &config("a2"),
            store.clone(),
            Command::Merge {
                other_id: "b".to_string(),
            },
        )
        .unwrap();

        assert_eq!(reopen(&store, "a").total_unique_items(), 1);
        assert_eq!(reopen(&store, "a2").total_unique_items(), 2);
        assert_eq!(reopen(&store, "a2").total_items(), 3);
        assert_eq!(reopen(&store, "b").total_items(), 2);
    }

    #[test]
    fn test_copy_onto_itself_is_rejected() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let err = run(
            &config("a"),
            store,
            Command::Copy {
                new_id: "a".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_clear_deletes_blob() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cfg = config("c1");
        run(&cfg, store.clone(), add("Widget", 1.0, 1)).unwrap();
        assert!(store.exists("c1").unwrap());

        run(&cfg, store.clone(), Command::Clear).unwrap();
        assert!(!store.exists("c1").unwrap());
    }

    #[test]
    fn test_summary_and_json_output() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cfg = config("c1");
        run(
            &cfg,
            store.clone(),
            Command::Add {
                name: "Widget".to_string(),
                price: 10.0,
                tax: 1.0,
                quantity: 2,
                attributes: vec![("size".to_string(), json!("M"))],
            },
        )
        .unwrap();

        let summary: Value =
            serde_json::from_str(&run(&cfg, store.clone(), Command::Summary).unwrap()).unwrap();
        assert_eq!(summary["total"], json!(22.0));
        assert_eq!(summary["uniqueItems"], json!(1));

        let blob: Value = serde_json::from_str(
            &run(&cfg, store.clone(), Command::Json { pretty: false }).unwrap(),
        )
        .unwrap();
        assert_eq!(blob["id"], json!("c1"));
        assert_eq!(blob["items"][0]["attributes"]["size"], json!("M"));
    }

    #[test]
    fn test_show_lists_lines_and_totals() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cfg = config("c1");
        run(&cfg, store.clone(), add("Widget", 10.0, 2)).unwrap();

        let output = run(&cfg, store, Command::Show).unwrap();
        assert!(output.starts_with("cart c1 (2 items, 1 unique)"));
        assert!(output.contains("Widget x2"));
        assert!(output.ends_with("subtotal $20.00  tax $0.00  total $20.00"));
    }
}
