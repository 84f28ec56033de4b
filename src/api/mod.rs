//! Request API module
//!
//! axum router exposing symbol management, ad-hoc lookups, health and the
//! real-time price channel.

mod error;
mod format;
mod handlers;
mod types;
mod ws;

pub use error::ApiError;
pub use format::format_market_cap;
pub use types::{
    HealthResponse, MessageResponse, QuoteResponse, RefreshResponse, TrackRequest, TrackResponse,
    TrackedView,
};

use crate::hub::BroadcastHub;
use crate::quote::QuoteClient;
use crate::registry::SymbolRegistry;
use crate::scheduler::RefreshScheduler;
use axum::http::{header, HeaderValue};
use axum::middleware;
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn SymbolRegistry>,
    pub client: Arc<dyn QuoteClient>,
    pub scheduler: Arc<RefreshScheduler>,
    pub hub: BroadcastHub,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/refresh", post(handlers::refresh))
        .route("/stock", get(handlers::stock))
        .route("/track", post(handlers::track))
        .route("/tracked", get(handlers::list_tracked))
        .route("/tracked/{id}", delete(handlers::untrack))
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::map_response(allow_any_origin))
        .with_state(state)
}

async fn allow_any_origin(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
