//! Error types for the replay API server.
//!
//! Storage problems never surface here: missing and unreadable simulations
//! are answered with an explanatory payload. [`ObserverError`] covers what
//! is left, namely bad requests and failures of the server itself, and
//! converts into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reverie_types::SimIdError;

/// Errors that can occur in the replay API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The path id is not a valid simulation id.
    #[error("invalid simulation id: {0}")]
    InvalidId(#[from] SimIdError),

    /// An invalid query parameter was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidId(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
