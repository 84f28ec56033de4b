//! API error mapping

use crate::quote::FetchError;
use crate::registry::{StorageError, ValidationError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    BadRequest(String),
    /// Provider answered but left required fields empty
    #[error("Incomplete data from quote provider")]
    IncompleteData {
        symbol: String,
        missing: Vec<&'static str>,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::IncompleteData { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Fetch(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ApiError::IncompleteData { symbol, missing } => json!({
                "error": self.to_string(),
                "symbol": symbol,
                "missing": missing,
            }),
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure while handling request");
                json!({ "error": "Storage failure" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
