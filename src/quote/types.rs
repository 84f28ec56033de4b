//! Quote client types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fields returned by the quote provider for one fetch.
///
/// Every field is optional: `None` means the provider did not supply it
/// on this call, not that the value is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub price: Option<f64>,
    pub market_cap: Option<i64>,
    pub currency: Option<String>,
}

impl QuoteSnapshot {
    /// Names of the fields the provider failed to supply, in declaration order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.price.is_none() {
            missing.push("price");
        }
        if self.market_cap.is_none() {
            missing.push("market_cap");
        }
        if self.currency.is_none() {
            missing.push("currency");
        }
        missing
    }
}

/// Quote provider errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Provider has no data for this symbol
    #[error("Symbol not found: {0}")]
    NotFound(String),
    /// Request exceeded its time bound
    #[error("Quote request timed out")]
    Timeout,
    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),
    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {0}")]
    Http(u16),
    /// Response body did not have the expected shape
    #[error("Malformed provider response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }

    /// Errors worth retrying on the next tick
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Network(_) => true,
            FetchError::Http(status) => *status == 429 || *status >= 500,
            FetchError::NotFound(_) | FetchError::Decode(_) => false,
        }
    }
}
