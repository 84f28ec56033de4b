//! Quote command implementation

use super::quote_client;
use crate::api::QuoteResponse;
use crate::config::Config;
use crate::registry::normalize_symbol;
use clap::Args;

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Ticker to look up
    #[arg(default_value = "AAPL")]
    pub symbol: String,
}

impl QuoteArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbol = normalize_symbol(&self.symbol)?;
        let snapshot = quote_client(config).fetch(&symbol).await?;

        let missing = snapshot.missing_fields();
        if !missing.is_empty() {
            tracing::warn!(%symbol, ?missing, "Provider left fields empty");
        }

        let response = QuoteResponse::new(symbol, snapshot);
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}
