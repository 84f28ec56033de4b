//! Shared test harness

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stock_pulse::api::{self, AppState};
use stock_pulse::hub::BroadcastHub;
use stock_pulse::quote::{YahooConfig, YahooQuoteClient};
use stock_pulse::registry::SqliteRegistry;
use stock_pulse::scheduler::{RefreshScheduler, SchedulerHandle};
use tokio::net::TcpListener;

#[derive(Default)]
struct StubState {
    quotes: HashMap<String, Value>,
    failures: HashMap<String, u16>,
}

/// Local stand-in for the Yahoo quote endpoint
#[derive(Clone)]
pub struct StubProvider {
    state: Arc<Mutex<StubState>>,
    pub base_url: String,
}

impl StubProvider {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(StubState::default()));
        let app = Router::new()
            .route("/v7/finance/quote", get(stub_quote))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{}", addr),
        }
    }

    pub fn set_quote(
        &self,
        symbol: &str,
        price: Option<f64>,
        market_cap: Option<i64>,
        currency: Option<&str>,
    ) {
        let quote = json!({
            "symbol": symbol,
            "regularMarketPrice": price,
            "marketCap": market_cap,
            "currency": currency,
        });
        let mut state = self.state.lock().unwrap();
        state.failures.remove(symbol);
        state.quotes.insert(symbol.to_string(), quote);
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        self.set_quote(symbol, Some(price), Some(2_500_000_000_000), Some("USD"));
    }

    pub fn fail_with(&self, symbol: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(symbol.to_string(), status);
    }
}

async fn stub_quote(
    State(state): State<Arc<Mutex<StubState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let symbol = params.get("symbols").cloned().unwrap_or_default();
    let state = state.lock().unwrap();

    if let Some(status) = state.failures.get(&symbol) {
        let status = StatusCode::from_u16(*status).unwrap();
        return (status, "stub failure").into_response();
    }

    let result: Vec<Value> = state.quotes.get(&symbol).cloned().into_iter().collect();
    Json(json!({ "quoteResponse": { "result": result, "error": null } })).into_response()
}

/// A running API server wired to a stub provider
pub struct TestApp {
    pub base_url: String,
    pub ws_url: String,
    pub http: reqwest::Client,
    pub provider: StubProvider,
    pub registry: Arc<SqliteRegistry>,
    pub hub: BroadcastHub,
    pub scheduler_handle: Option<SchedulerHandle>,
}

impl TestApp {
    /// Serve the API without a background loop; ticks are driven by `/refresh`
    pub async fn spawn() -> Self {
        Self::build(None, 16).await
    }

    /// Serve the API with the refresh loop running at `interval`
    pub async fn spawn_with_refresh(interval: Duration) -> Self {
        Self::build(Some(interval), 16).await
    }

    /// Serve the API with a hub whose subscribers buffer `capacity` events
    pub async fn spawn_with_hub_capacity(capacity: usize) -> Self {
        Self::build(None, capacity).await
    }

    async fn build(refresh_interval: Option<Duration>, hub_capacity: usize) -> Self {
        let provider = StubProvider::start().await;
        let registry = Arc::new(SqliteRegistry::in_memory().await.unwrap());
        let client = Arc::new(YahooQuoteClient::with_config(YahooConfig {
            base_url: provider.base_url.clone(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        }));
        let hub = BroadcastHub::new(hub_capacity);

        let scheduler = Arc::new(
            RefreshScheduler::new(registry.clone(), client.clone(), hub.clone())
                .fetch_timeout(Duration::from_secs(2))
                .interval(refresh_interval.unwrap_or(Duration::from_secs(3600))),
        );
        let scheduler_handle = refresh_interval.map(|_| Arc::clone(&scheduler).spawn());

        let app = api::router(AppState {
            registry: registry.clone(),
            client,
            scheduler,
            hub: hub.clone(),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            ws_url: format!("ws://{}/ws", addr),
            http: reqwest::Client::new(),
            provider,
            registry,
            hub,
            scheduler_handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn track(&self, symbol: &str) -> reqwest::Response {
        self.http
            .post(self.url("/track"))
            .json(&json!({ "symbol": symbol }))
            .send()
            .await
            .unwrap()
    }

    pub async fn refresh(&self) -> Value {
        let response = self.http.post(self.url("/refresh")).send().await.unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    pub async fn tracked(&self) -> Vec<Value> {
        let response = self.http.get(self.url("/tracked")).send().await.unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    /// Wait until the hub has `n` subscribers
    pub async fn wait_for_subscribers(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.hub.subscriber_count() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("subscribers did not register in time");
    }
}
