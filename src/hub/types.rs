//! Broadcast payload types

use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscriber identifier
pub type SubscriberId = Uuid;

/// A price change pushed to every connected subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdateEvent {
    pub symbol: String,
    /// New price, rounded to 2 decimal places
    pub price: f64,
    /// Difference from the previously stored price; `None` without a baseline
    pub absolute_change: Option<f64>,
    /// Change relative to the previously stored price, in percent
    pub percent_change: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl PriceUpdateEvent {
    /// Build an event for `price`, measuring change against `previous`
    pub fn new(symbol: impl Into<String>, price: f64, previous: Option<f64>) -> Self {
        let (absolute_change, percent_change) = match previous {
            Some(previous) => price_change(price, previous),
            None => (None, None),
        };

        Self {
            symbol: symbol.into(),
            price: round2(price),
            absolute_change,
            percent_change,
            timestamp: Utc::now(),
        }
    }
}

/// Absolute and percent change, both rounded to 2 decimal places
fn price_change(price: f64, previous: f64) -> (Option<f64>, Option<f64>) {
    let (Some(current), Some(baseline)) = (Decimal::from_f64(price), Decimal::from_f64(previous))
    else {
        return (None, None);
    };

    let diff = current - baseline;
    let absolute = round_decimal(diff).to_f64();
    let percent = if baseline.is_zero() {
        None
    } else {
        round_decimal(diff / baseline * dec!(100)).to_f64()
    };

    (absolute, percent)
}

fn round_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to 2 decimal places; non-finite input is returned unchanged
fn round2(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(round_decimal)
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
