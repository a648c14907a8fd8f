//! sqlx-backed storage adapters for the task repository contract.
//!
//! Two reference backends: an embedded SQLite store (file-backed or
//! in-memory) and a networked PostgreSQL store. Both ensure their schema on
//! construction, and both translate sqlx errors into the `tasks-core` error
//! taxonomy at this boundary; no sqlx error type escapes this crate.

mod postgres;
mod sqlite;

pub use postgres::PgTaskRepository;
pub use sqlite::SqliteTaskRepository;

use tasks_core::{TaskError, TaskId};

/// Convert an API-level unsigned id into the signed column type both
/// backends store. Ids beyond `i64::MAX` can never have been assigned, so
/// they resolve to NotFound rather than a cast error.
pub(crate) fn db_id(id: TaskId) -> Result<i64, TaskError> {
    i64::try_from(id).map_err(|_| TaskError::NotFound)
}
