//! Request and response bodies

use super::format::format_market_cap;
use crate::quote::QuoteSnapshot;
use crate::registry::TrackedSymbol;
use crate::scheduler::TickReport;
use serde::{Deserialize, Serialize};

/// `POST /track` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackRequest {
    #[serde(default)]
    pub symbol: Option<String>,
}

/// `GET /stock` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockQuery {
    pub symbol: Option<String>,
}

/// `GET /ping` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub server: String,
    pub database: String,
}

/// `GET /stock` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub symbol: String,
    pub price: Option<f64>,
    pub market_cap: Option<i64>,
    pub currency: Option<String>,
}

impl QuoteResponse {
    pub fn new(symbol: impl Into<String>, snapshot: QuoteSnapshot) -> Self {
        Self {
            symbol: symbol.into(),
            price: snapshot.price,
            market_cap: snapshot.market_cap,
            currency: snapshot.currency,
        }
    }
}

/// `POST /track` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackResponse {
    pub message: String,
    pub id: i64,
    pub symbol: String,
    pub price: Option<f64>,
    pub market_cap: Option<i64>,
    pub currency: Option<String>,
}

impl From<TrackedSymbol> for TrackResponse {
    fn from(tracked: TrackedSymbol) -> Self {
        Self {
            message: format!("{} tracked", tracked.symbol),
            id: tracked.id,
            symbol: tracked.symbol,
            price: tracked.price,
            market_cap: tracked.market_cap,
            currency: tracked.currency,
        }
    }
}

/// One entry of `GET /tracked`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedView {
    pub id: i64,
    pub symbol: String,
    pub price: Option<f64>,
    /// Magnitude-suffixed, e.g. "2.50T"
    pub market_cap: Option<String>,
    pub currency: Option<String>,
}

impl From<TrackedSymbol> for TrackedView {
    fn from(tracked: TrackedSymbol) -> Self {
        Self {
            id: tracked.id,
            symbol: tracked.symbol,
            price: tracked.price,
            market_cap: format_market_cap(tracked.market_cap),
            currency: tracked.currency,
        }
    }
}

/// `POST /refresh` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: TickReport,
}

impl From<TickReport> for RefreshResponse {
    fn from(report: TickReport) -> Self {
        Self {
            message: format!("Updated {} stocks successfully", report.updated),
            report,
        }
    }
}

/// Plain confirmation body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
