//! Refresh loop implementation

use super::{SymbolOutcome, TickReport};
use crate::config::RefreshConfig;
use crate::hub::{BroadcastHub, PriceUpdateEvent};
use crate::quote::{FetchError, QuoteClient};
use crate::registry::{SymbolRegistry, TrackedSymbol};
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Periodically refreshes every tracked symbol
pub struct RefreshScheduler {
    registry: Arc<dyn SymbolRegistry>,
    client: Arc<dyn QuoteClient>,
    hub: BroadcastHub,
    interval: Duration,
    fetch_timeout: Duration,
    max_concurrent_fetches: usize,
    /// Held for a whole pass so the loop and on-demand refreshes never overlap
    tick_lock: Mutex<()>,
}

impl RefreshScheduler {
    /// Create a scheduler with default timing
    pub fn new(
        registry: Arc<dyn SymbolRegistry>,
        client: Arc<dyn QuoteClient>,
        hub: BroadcastHub,
    ) -> Self {
        let defaults = RefreshConfig::default();
        Self {
            registry,
            client,
            hub,
            interval: defaults.interval(),
            fetch_timeout: defaults.fetch_timeout(),
            max_concurrent_fetches: defaults.max_concurrent_fetches,
            tick_lock: Mutex::new(()),
        }
    }

    /// Apply timing from the refresh config
    pub fn with_config(self, config: &RefreshConfig) -> Self {
        self.interval(config.interval())
            .fetch_timeout(config.fetch_timeout())
            .max_concurrent_fetches(config.max_concurrent_fetches)
    }

    /// Set the delay between the end of one tick and the start of the next
    pub fn interval(mut self, d: Duration) -> Self {
        self.interval = d;
        self
    }

    /// Set the per-symbol fetch bound
    pub fn fetch_timeout(mut self, d: Duration) -> Self {
        self.fetch_timeout = d;
        self
    }

    /// Set how many symbols are fetched at once
    pub fn max_concurrent_fetches(mut self, n: usize) -> Self {
        self.max_concurrent_fetches = n.max(1);
        self
    }

    /// Start the loop on the tokio runtime
    pub fn spawn(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            self.run(shutdown_rx).await;
        });

        SchedulerHandle { shutdown_tx, join }
    }

    /// Run ticks until `shutdown` flips to true or its sender is dropped
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            fetch_timeout_ms = self.fetch_timeout.as_millis() as u64,
            "Refresh scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.run_tick(Some(&shutdown)).await;
            tracing::debug!(
                attempted = report.attempted,
                updated = report.updated,
                failed = report.failed,
                skipped = report.skipped,
                "Refresh tick complete"
            );

            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Shutdown sender dropped");
                        break;
                    }
                }
            }
        }

        tracing::info!("Refresh scheduler stopped");
    }

    /// Run exactly one pass over the tracked set
    pub async fn refresh_once(&self) -> TickReport {
        self.run_tick(None).await
    }

    async fn run_tick(&self, shutdown: Option<&watch::Receiver<bool>>) -> TickReport {
        let _pass = self.tick_lock.lock().await;
        let started = Instant::now();

        let tracked = match self.registry.list_all().await {
            Ok(tracked) => tracked,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list tracked symbols, skipping tick");
                telemetry::incr_counter(CounterMetric::StorageFailures);
                return TickReport::default();
            }
        };
        telemetry::set_gauge(GaugeMetric::TrackedSymbols, tracked.len() as f64);

        let attempted = tracked.len();
        let outcomes: Vec<SymbolOutcome> = stream::iter(tracked)
            .map(|symbol: TrackedSymbol| async move {
                // Shutdown is honoured between symbols, never mid-update
                if shutdown.is_some_and(|rx| *rx.borrow()) {
                    return SymbolOutcome::Skipped;
                }
                self.refresh_symbol(&symbol).await
            })
            .buffer_unordered(self.max_concurrent_fetches)
            .collect()
            .await;

        let mut report = TickReport {
            attempted,
            ..Default::default()
        };
        for outcome in &outcomes {
            report.record(outcome);
        }

        telemetry::incr_counter(CounterMetric::RefreshTicks);
        telemetry::record_latency(LatencyMetric::RefreshTick, started.elapsed());
        report
    }

    /// Fetch, store, then publish one symbol
    async fn refresh_symbol(&self, tracked: &TrackedSymbol) -> SymbolOutcome {
        let symbol = tracked.symbol.as_str();

        let started = Instant::now();
        let fetched = tokio::time::timeout(self.fetch_timeout, self.client.fetch(symbol))
            .await
            .unwrap_or(Err(FetchError::Timeout));
        telemetry::record_latency(LatencyMetric::QuoteFetch, started.elapsed());

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    symbol,
                    error = %e,
                    transient = e.is_transient(),
                    "Quote fetch failed, keeping last known values"
                );
                telemetry::incr_counter(CounterMetric::FetchFailures);
                return SymbolOutcome::FetchFailed(e);
            }
        };

        let Some(price) = snapshot.price else {
            tracing::warn!(symbol, "Quote has no price, keeping last known values");
            telemetry::incr_counter(CounterMetric::FetchFailures);
            return SymbolOutcome::NoPrice;
        };

        // Change is measured against whatever was stored at write time, which
        // may differ from the tick-start snapshot
        let event = match self.registry.update_existing(symbol, &snapshot).await {
            Ok(Some(update)) => PriceUpdateEvent::new(symbol, price, update.previous_price),
            Ok(None) => {
                tracing::debug!(symbol, "Symbol untracked during refresh, dropping update");
                return SymbolOutcome::Untracked;
            }
            Err(e) => {
                tracing::warn!(symbol, error = %e, "Failed to store quote, will retry next tick");
                telemetry::incr_counter(CounterMetric::StorageFailures);
                return SymbolOutcome::StoreFailed;
            }
        };

        let delivered = self.hub.publish(&event);
        tracing::debug!(
            symbol,
            price = event.price,
            change = ?event.absolute_change,
            delivered,
            "Published price update"
        );

        SymbolOutcome::Updated(event)
    }
}

/// Handle to a running scheduler task
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal shutdown and wait for the loop to exit
    ///
    /// A symbol already being fetched finishes its update; nothing is
    /// published after this returns.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Refresh scheduler task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
