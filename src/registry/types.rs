//! Registry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted ticker
pub const MAX_SYMBOL_LEN: usize = 10;

/// A symbol the user asked to track, with its last known quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedSymbol {
    /// Store-assigned identifier
    pub id: i64,
    /// Normalized uppercase ticker
    pub symbol: String,
    /// Last successfully observed price
    pub price: Option<f64>,
    /// Last successfully observed market capitalization
    pub market_cap: Option<i64>,
    /// Quote currency code
    pub currency: Option<String>,
    /// Time of the last successful write
    pub updated_at: DateTime<Utc>,
}

/// A fresh quote written over an existing record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    /// Price stored immediately before this write
    pub previous_price: Option<f64>,
    /// The record after the write
    pub record: TrackedSymbol,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored row could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Symbol validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No symbol provided")]
    Empty,
    #[error("Symbol too long: {0} (max {MAX_SYMBOL_LEN} characters)")]
    TooLong(String),
    #[error("Invalid character in symbol: {0}")]
    InvalidCharacter(String),
}

/// Trim and uppercase a user-supplied ticker, rejecting anything that
/// cannot be a ticker
pub fn normalize_symbol(raw: &str) -> Result<String, ValidationError> {
    let symbol = raw.trim().to_ascii_uppercase();

    if symbol.is_empty() {
        return Err(ValidationError::Empty);
    }
    if symbol.chars().count() > MAX_SYMBOL_LEN {
        return Err(ValidationError::TooLong(symbol));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(ValidationError::InvalidCharacter(symbol));
    }

    Ok(symbol)
}
