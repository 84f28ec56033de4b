//! Prometheus metrics

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Completed refresh passes
    RefreshTicks,
    /// Quote fetches that failed or returned no price
    FetchFailures,
    /// Registry writes that failed during refresh
    StorageFailures,
    /// Price updates handed to the broadcast hub
    EventsPublished,
    /// Subscribers disconnected for a full or closed queue
    SubscribersDropped,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Symbols seen in the last refresh pass
    TrackedSymbols,
    /// Currently connected subscribers
    Subscribers,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Full refresh pass
    RefreshTick,
    /// Single quote fetch
    QuoteFetch,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::RefreshTicks => "stockpulse_refresh_ticks_total",
            CounterMetric::FetchFailures => "stockpulse_fetch_failures_total",
            CounterMetric::StorageFailures => "stockpulse_storage_failures_total",
            CounterMetric::EventsPublished => "stockpulse_events_published_total",
            CounterMetric::SubscribersDropped => "stockpulse_subscribers_dropped_total",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::TrackedSymbols => "stockpulse_tracked_symbols",
            GaugeMetric::Subscribers => "stockpulse_subscribers",
        }
    }
}

impl LatencyMetric {
    fn name(self) -> &'static str {
        match self {
            LatencyMetric::RefreshTick => "stockpulse_refresh_tick_latency_ms",
            LatencyMetric::QuoteFetch => "stockpulse_quote_fetch_latency_ms",
        }
    }
}

/// Install the Prometheus exporter, serving `/metrics` on `port`
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Increment a counter by one
pub fn incr_counter(metric: CounterMetric) {
    incr_counter_by(metric, 1);
}

/// Increment a counter by `value`
pub fn incr_counter_by(metric: CounterMetric, value: u64) {
    metrics::counter!(metric.name()).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Record a latency measurement in milliseconds
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    metrics::histogram!(metric.name()).record(duration.as_secs_f64() * 1000.0);
}
