//! Instrument directory binary
//!
//! Loads the instrument catalog and answers resolution, search and
//! statistics queries from the command line, or keeps it fresh in the
//! background with `serve`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use instrument_directory::{DirectoryConfig, InstrumentDirectory};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "instrument-directory")]
#[command(about = "Resolve trading symbols to instrument keys")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (optional; env overrides use INSTRUMENT_DIRECTORY__*)
    #[arg(long, default_value = "instrument-directory.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a symbol to its instrument key
    Resolve { exchange: String, symbol: String },

    /// Search equities by symbol, name or short name
    Search {
        exchange: String,
        query: String,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Check whether a symbol resolves
    Validate { exchange: String, symbol: String },

    /// Print catalog statistics
    Stats,

    /// Load the catalog and report the outcome
    Refresh,

    /// Keep the catalog fresh until interrupted
    Serve,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Resolution<'a> {
    exchange: &'a str,
    symbol: &'a str,
    instrument_key: String,
}

#[derive(Serialize)]
struct Validation<'a> {
    exchange: &'a str,
    symbol: &'a str,
    valid: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = DirectoryConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let directory = Arc::new(
        InstrumentDirectory::new(config).context("Failed to build instrument directory")?,
    );
    let initial = directory
        .start()
        .await
        .context("Failed to load instrument catalog")?;

    match cli.command {
        Commands::Resolve { exchange, symbol } => {
            let instrument_key = directory.resolve_instrument_key(&exchange, &symbol)?;
            print_json(&Resolution {
                exchange: &exchange,
                symbol: &symbol,
                instrument_key,
            })?;
        }
        Commands::Search {
            exchange,
            query,
            limit,
        } => {
            let results = match limit {
                Some(limit) => directory.search_instruments(&exchange, &query, limit),
                None => directory.search_instruments_default(&exchange, &query),
            };
            print_json(&results)?;
        }
        Commands::Validate { exchange, symbol } => {
            let valid = directory.is_valid_symbol(&exchange, &symbol);
            print_json(&Validation {
                exchange: &exchange,
                symbol: &symbol,
                valid,
            })?;
        }
        Commands::Stats => print_json(&directory.statistics())?,
        Commands::Refresh => print_json(&initial)?,
        Commands::Serve => serve(directory).await?,
    }

    Ok(())
}

async fn serve(directory: Arc<InstrumentDirectory>) -> Result<()> {
    if !directory.config().cache.auto_refresh {
        warn!("Auto refresh disabled, catalog will not be reloaded");
    }
    let refresher = directory
        .config()
        .cache
        .auto_refresh
        .then(|| directory.spawn_auto_refresh());

    info!(
        instruments = directory.statistics().total_instrument_count,
        "Instrument directory ready, press Ctrl+C to stop"
    );
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutting down instrument directory");
    if let Some(handle) = refresher {
        handle.abort();
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{text}");
    Ok(())
}
