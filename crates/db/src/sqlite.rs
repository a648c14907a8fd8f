//! Embedded SQLite task store.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use tasks_core::{Task, TaskError, TaskId, TaskRepository};

use crate::db_id;

/// Column list for tasks queries.
const TASK_COLUMNS: &str = "id, description, deadline, completed";

/// Idempotent schema-ensure, run on every startup.
const ENSURE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL,
    deadline TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT FALSE
)";

/// Row shape shared by all tasks queries. Ids are stored signed; the
/// constructors below never insert a negative one.
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    description: String,
    deadline: DateTime<Utc>,
    completed: bool,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id as TaskId,
            description: row.description,
            deadline: row.deadline,
            completed: row.completed,
        }
    }
}

/// Task store backed by an embedded SQLite database.
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    /// Open (creating if missing) the database file at `path` and ensure
    /// the tasks table exists.
    pub async fn connect(path: &Path) -> Result<Self, TaskError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(TaskError::storage)?;
        Self::with_pool(pool).await
    }

    /// Open a private in-memory database. The pool is pinned to a single
    /// connection so every query sees the same database; used by tests.
    pub async fn in_memory() -> Result<Self, TaskError> {
        let options =
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(TaskError::storage)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(TaskError::storage)?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, TaskError> {
        sqlx::query(ENSURE_SCHEMA)
            .execute(&pool)
            .await
            .map_err(TaskError::storage)?;
        tracing::debug!("ensured sqlite tasks table exists");
        Ok(Self { pool })
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn get_all(&self) -> Result<Vec<Task>, TaskError> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks");
        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(TaskError::storage)?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Task, TaskError> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?");
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(db_id(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(TaskError::storage)?
            .map(Task::from)
            .ok_or(TaskError::NotFound)
    }

    async fn add(&self, task: Task) -> Result<Task, TaskError> {
        let query = format!(
            "INSERT INTO tasks (description, deadline, completed)
             VALUES (?, ?, ?)
             RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(&task.description)
            .bind(task.deadline)
            .bind(task.completed)
            .fetch_one(&self.pool)
            .await
            .map_err(TaskError::storage)?;
        Ok(row.into())
    }

    async fn update(&self, task: &Task) -> Result<Task, TaskError> {
        // An id outside the signed range was never assigned, so there is
        // nothing to update.
        let id = db_id(task.id).map_err(|_| TaskError::NotUpdated)?;
        let query = format!(
            "UPDATE tasks SET description = ?, deadline = ?, completed = ?
             WHERE id = ?
             RETURNING {TASK_COLUMNS}"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(&task.description)
            .bind(task.deadline)
            .bind(task.completed)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(TaskError::storage)?
            .map(Task::from)
            .ok_or(TaskError::NotUpdated)
    }

    async fn delete_by_id(&self, id: TaskId) -> Result<Task, TaskError> {
        // Read-then-delete so the caller gets the row's last value.
        let task = self.get_by_id(id).await?;
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(db_id(id)?)
            .execute(&self.pool)
            .await
            .map_err(TaskError::storage)?;
        Ok(task)
    }
}
