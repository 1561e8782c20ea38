//! Error types for the contribution API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//! Client mistakes map to `400`; store failures map to `500`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lifegraph_db::DbError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body could not be decoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// An invalid query parameter was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The store failed to open, execute, or commit.
    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::InvalidBody(msg) | Self::InvalidQuery(msg) => msg.clone(),
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error while handling request");
                String::from("Database error")
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
