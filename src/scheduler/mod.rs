//! Refresh scheduler module
//!
//! Background loop that periodically re-quotes every tracked symbol, writes
//! the results back to the registry and publishes price updates.
//!
//! Each tick:
//! 1. Snapshots the registry's tracked set
//! 2. Fetches every symbol independently, with a bounded timeout
//! 3. Stores and publishes each successful quote
//! 4. Sleeps for the configured interval, measured from the end of the tick

mod refresher;

pub use refresher::{RefreshScheduler, SchedulerHandle};

use crate::hub::PriceUpdateEvent;
use crate::quote::FetchError;
use serde::Serialize;

/// Result of refreshing one symbol
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    /// Stored and published
    Updated(PriceUpdateEvent),
    /// Provider failed; stored values untouched
    FetchFailed(FetchError),
    /// Provider answered without a price; stored values untouched
    NoPrice,
    /// Registry write failed; retried next tick
    StoreFailed,
    /// Symbol was untracked while its fetch was in flight
    Untracked,
    /// Not attempted because shutdown was requested
    Skipped,
}

/// Summary of one refresh pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Symbols in the tracked set when the tick started
    pub attempted: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl TickReport {
    fn record(&mut self, outcome: &SymbolOutcome) {
        match outcome {
            SymbolOutcome::Updated(_) => self.updated += 1,
            SymbolOutcome::FetchFailed(_) | SymbolOutcome::NoPrice | SymbolOutcome::StoreFailed => {
                self.failed += 1
            }
            SymbolOutcome::Untracked | SymbolOutcome::Skipped => self.skipped += 1,
        }
    }
}
