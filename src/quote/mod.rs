//! Quote client module
//!
//! Fetches live price, market cap and currency for a single symbol from an
//! external provider. Implementations never retry; the caller decides.

mod types;
mod yahoo;

pub use types::{FetchError, QuoteSnapshot};
pub use yahoo::{YahooConfig, YahooQuoteClient, YAHOO_API_URL};

use async_trait::async_trait;

/// Trait for quote provider implementations
#[async_trait]
pub trait QuoteClient: Send + Sync {
    /// Fetch the current snapshot for `symbol`
    async fn fetch(&self, symbol: &str) -> Result<QuoteSnapshot, FetchError>;
}
