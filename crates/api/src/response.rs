//! Uniform response envelope for all task API handlers.
//!
//! Every response, success or failure, has the shape
//! `{ "data": ..., "error": <code>, "message": ... }` where `error` is 0 on
//! success and otherwise equals the HTTP status code. Use [`success`]
//! instead of ad-hoc `serde_json::json!` to keep serialization consistent.

use axum::Json;
use serde::Serialize;

/// The `{data, error, message}` envelope.
#[derive(Debug, Serialize)]
pub struct ApiStatus<T: Serialize> {
    pub data: T,
    pub error: u16,
    pub message: String,
}

/// Wrap a payload in the success envelope (`error` 0, `message` "success").
pub fn success<T: Serialize>(data: T) -> Json<ApiStatus<T>> {
    Json(ApiStatus {
        data,
        error: 0,
        message: "success".to_string(),
    })
}
