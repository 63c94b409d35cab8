use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mget_collector::registry::RegistryError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
/// Details are logged, never returned to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Encoding the metrics snapshot failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Registry(err) => {
                tracing::error!(error = %err, "Failed to encode metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = json!({
            "error": "An internal error occurred",
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
