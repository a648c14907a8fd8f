use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tasks_core::TaskError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`TaskError`] for domain errors and adds the client-error variant
/// for unparseable ids and malformed bodies. Implements [`IntoResponse`]
/// to produce the uniform `{data, error, message}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain or storage error from `tasks-core`.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// A bad request with a human-readable message.
    #[error("{0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Task(TaskError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Task(
                TaskError::NoRepository | TaskError::NotUpdated | TaskError::Storage(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // The underlying error text goes out verbatim as `message`; this
        // API does not redact internal detail.
        let message = self.to_string();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %message, "request failed");
        }

        let body = json!({
            "data": null,
            "error": status.as_u16(),
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}
