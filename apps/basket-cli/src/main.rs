//! # basket: Command-Line Cart
//!
//! Entry point for the `basket` binary.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize logging (tracing → stderr)                               │
//! │  3. Load configuration (BASKET_* env, then flags)                       │
//! │  4. Open the store (file / sqlite / memory)                             │
//! │  5. Run one command, print its output to stdout                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod commands;
mod config;
mod error;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::CliConfig;
use crate::error::CliResult;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "Command failed");
            eprintln!("basket: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> CliResult<String> {
    let mut config = CliConfig::load()?;
    cli.apply_overrides(&mut config);

    info!(cart_id = %config.cart_id, store = %config.store, "Starting basket");

    let store = config.open_store()?;
    commands::run(&config, store, cli.command)
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: Command failures
/// - WARN: Dropped restore entries, failed autosaves
/// - INFO: Store and database lifecycle
/// - DEBUG: Per-operation cart detail
///
/// ## Environment Variable
/// Set `RUST_LOG` to control logging, e.g. `RUST_LOG=basket=debug`.
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,basket=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
