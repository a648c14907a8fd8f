//! Shared application router builder.
//!
//! Both the production binary and the integration tests build the router
//! through [`build_app_router`], so they exercise the same routes and
//! middleware stack.

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handlers::{health, tasks};
use crate::state::AppState;

/// Build the full application [`Router`]: health probe, task CRUD routes,
/// request tracing, and (when configured) the static-asset fallback for
/// paths outside the task API.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let app = Router::new()
        .merge(health::router())
        .route(
            "/tasks",
            get(tasks::list_tasks)
                .post(tasks::add_task)
                .put(tasks::update_task),
        )
        .route(
            "/tasks/{id}",
            get(tasks::get_task).delete(tasks::delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match &config.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    }
}
