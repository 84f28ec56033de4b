//! Yahoo Finance quote client
//!
//! Reads price, market cap and currency from the v7 quote endpoint.

use super::{FetchError, QuoteClient, QuoteSnapshot};
use crate::config::QuoteConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance API base URL
pub const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

/// Configuration for the Yahoo client
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base URL for the quote API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO_API_URL.to_string(),
            timeout: Duration::from_secs(5),
            user_agent: concat!("stock-pulse/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl From<&QuoteConfig> for YahooConfig {
    fn from(config: &QuoteConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Client for the Yahoo Finance quote endpoint
pub struct YahooQuoteClient {
    config: YahooConfig,
    client: Client,
}

impl YahooQuoteClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(YahooConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: YahooConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn quote_url(&self) -> String {
        format!("{}/v7/finance/quote", self.config.base_url)
    }
}

impl Default for YahooQuoteClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteClient for YahooQuoteClient {
    async fn fetch(&self, symbol: &str) -> Result<QuoteSnapshot, FetchError> {
        let url = self.quote_url();

        tracing::debug!(url = %url, symbol, "Fetching quote");

        let response = self
            .client
            .get(&url)
            .query(&[("symbols", symbol)])
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound(symbol.to_string())),
            status => return Err(FetchError::Http(status.as_u16())),
        }

        let body = response.text().await.map_err(map_transport_error)?;
        parse_quote_response(symbol, &body)
    }
}

fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Network(e.to_string())
    }
}

/// Top-level quote response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<YahooQuote>,
}

/// One quote entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuote {
    symbol: String,
    regular_market_price: Option<f64>,
    /// Occasionally serialized as a float
    market_cap: Option<f64>,
    currency: Option<String>,
}

/// Parse a quote response body into a snapshot for `symbol`
fn parse_quote_response(symbol: &str, body: &str) -> Result<QuoteSnapshot, FetchError> {
    let envelope: QuoteEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let mut results = envelope.quote_response.result;
    if results.is_empty() {
        return Err(FetchError::NotFound(symbol.to_string()));
    }

    let position = results
        .iter()
        .position(|q| q.symbol.eq_ignore_ascii_case(symbol))
        .unwrap_or(0);
    let quote = results.swap_remove(position);
    Ok(QuoteSnapshot {
        price: quote.regular_market_price,
        market_cap: quote.market_cap.map(|cap| cap.round() as i64),
        currency: quote.currency.filter(|c| !c.is_empty()),
    })
}
