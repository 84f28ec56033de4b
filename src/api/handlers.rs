//! HTTP request handlers

use super::error::ApiError;
use super::types::{
    HealthResponse, MessageResponse, QuoteResponse, RefreshResponse, StockQuery, TrackRequest,
    TrackResponse, TrackedView,
};
use super::AppState;
use crate::registry::{normalize_symbol, ValidationError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

const DEFAULT_LOOKUP_SYMBOL: &str = "AAPL";

/// `GET /ping`
pub async fn ping(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.registry.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                server: "online".to_string(),
                database: "connected".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: storage unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    server: "online".to_string(),
                    database: format!("error: {}", e),
                }),
            )
        }
    }
}

/// `POST /refresh`
pub async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    let report = state.scheduler.refresh_once().await;
    tracing::info!(
        attempted = report.attempted,
        updated = report.updated,
        failed = report.failed,
        "On-demand refresh complete"
    );
    Json(report.into())
}

/// `GET /stock?symbol=SYM`
pub async fn stock(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let raw = query.symbol.as_deref().unwrap_or(DEFAULT_LOOKUP_SYMBOL);
    let symbol = normalize_symbol(raw)?;

    let snapshot = state.client.fetch(&symbol).await?;
    Ok(Json(QuoteResponse::new(symbol, snapshot)))
}

/// `POST /track`
pub async fn track(
    State(state): State<AppState>,
    body: Result<Json<TrackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TrackResponse>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let raw = request.symbol.ok_or(ValidationError::Empty)?;
    let symbol = normalize_symbol(&raw)?;

    let snapshot = state.client.fetch(&symbol).await?;

    let missing = snapshot.missing_fields();
    if !missing.is_empty() {
        tracing::info!(%symbol, ?missing, "Rejecting track request with incomplete quote");
        return Err(ApiError::IncompleteData { symbol, missing });
    }

    let tracked = state.registry.upsert(&symbol, &snapshot).await?;
    tracing::info!(symbol = %tracked.symbol, id = tracked.id, "Symbol tracked");

    Ok((StatusCode::CREATED, Json(tracked.into())))
}

/// `DELETE /tracked/{id}`
pub async fn untrack(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.registry.remove(id).await? {
        return Err(ApiError::NotFound(format!("No tracked stock with id {}", id)));
    }

    tracing::info!(id, "Symbol untracked");
    Ok(Json(MessageResponse::new("Stock was deleted successfully")))
}

/// `GET /tracked`
pub async fn list_tracked(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrackedView>>, ApiError> {
    let tracked = state.registry.list_all().await?;
    Ok(Json(tracked.into_iter().map(TrackedView::from).collect()))
}
