#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tasks_api::config::{ServerConfig, StorageConfig};
use tasks_api::router::build_app_router;
use tasks_api::state::AppState;
use tasks_core::TaskService;
use tasks_db::SqliteTaskRepository;

/// Build a test `ServerConfig` with safe defaults: loopback, ephemeral
/// port, no static directory, no drain deadline.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        storage: StorageConfig::Sqlite {
            data_dir: PathBuf::from("./data"),
        },
        static_dir: None,
        shutdown_timeout: None,
    }
}

/// Build test application state over a fresh in-memory SQLite store.
pub async fn test_state() -> AppState {
    let repo = SqliteTaskRepository::in_memory()
        .await
        .expect("in-memory store must open");
    AppState {
        tasks: Arc::new(TaskService::new(Arc::new(repo))),
    }
}

/// Build the application router over a fresh in-memory store, mirroring
/// the construction in `main.rs`.
pub async fn build_test_app() -> Router {
    build_app_router(test_state().await, &test_config())
}

/// Send a GET request to the app.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a DELETE request to the app.
pub async fn delete(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a JSON body with the given method.
pub async fn send_json(
    app: Router,
    method: Method,
    path: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a raw (possibly invalid) body with the given method.
pub async fn send_raw(
    app: Router,
    method: Method,
    path: &str,
    body: &'static str,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Read the full response body as a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
