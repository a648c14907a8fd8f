use std::sync::Arc;

use tasks_core::TaskService;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheaply cloneable; all mutable state lives in the
/// storage backend behind the service.
#[derive(Clone)]
pub struct AppState {
    /// Task domain service, wired to a storage backend at startup.
    pub tasks: Arc<TaskService>,
}
