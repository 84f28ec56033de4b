//! CLI interface for stock-pulse
//!
//! Provides subcommands for:
//! - `serve`: Run the HTTP/WebSocket service with background refresh
//! - `quote`: One-off quote lookup
//! - `refresh`: Refresh every tracked symbol once
//! - `list`: Show tracked symbols
//! - `config`: Show the effective configuration

mod list;
mod quote;
mod refresh;
mod serve;

pub use list::ListArgs;
pub use quote::QuoteArgs;
pub use refresh::RefreshArgs;
pub use serve::ServeArgs;

use crate::config::Config;
use crate::quote::{QuoteClient, YahooConfig, YahooQuoteClient};
use crate::registry::{SqliteRegistry, SymbolRegistry};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "stock-pulse")]
#[command(about = "Tracks stock symbols and streams live price updates")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the API server and refresh loop
    Serve(ServeArgs),
    /// Look up a quote without tracking it
    Quote(QuoteArgs),
    /// Refresh all tracked symbols once
    Refresh(RefreshArgs),
    /// List tracked symbols
    List(ListArgs),
    /// Show configuration
    Config,
}

/// Open the configured registry
async fn open_registry(config: &Config) -> anyhow::Result<Arc<dyn SymbolRegistry>> {
    let registry = SqliteRegistry::from_config(&config.storage)
        .await
        .with_context(|| format!("Failed to open registry at {}", config.storage.database_url))?;
    Ok(Arc::new(registry))
}

/// Build the configured quote client
fn quote_client(config: &Config) -> Arc<dyn QuoteClient> {
    Arc::new(YahooQuoteClient::with_config(YahooConfig::from(
        &config.quote,
    )))
}
