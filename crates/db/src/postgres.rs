//! Networked PostgreSQL task store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use tasks_core::{Task, TaskError, TaskId, TaskRepository};

use crate::db_id;

/// Column list for tasks queries.
const TASK_COLUMNS: &str = "id, description, deadline, completed";

/// Idempotent schema-ensure, run on every startup.
const ENSURE_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id BIGSERIAL PRIMARY KEY,
    description TEXT NOT NULL,
    deadline TIMESTAMPTZ NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT FALSE
)";

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

/// Task store backed by a PostgreSQL server.
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    /// Connect to the database at `database_url` and ensure the tasks
    /// table exists. A failure here means the process cannot proceed
    /// without storage; callers treat it as fatal.
    pub async fn connect(database_url: &str) -> Result<Self, TaskError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .map_err(TaskError::storage)?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, ensuring the schema first.
    pub async fn with_pool(pool: PgPool) -> Result<Self, TaskError> {
        sqlx::query(ENSURE_SCHEMA)
            .execute(&pool)
            .await
            .map_err(TaskError::storage)?;
        tracing::debug!("ensured postgres tasks table exists");
        Ok(Self { pool })
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn get_all(&self) -> Result<Vec<Task>, TaskError> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks");
        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(TaskError::storage)?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Task, TaskError> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
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
             VALUES ($1, $2, $3)
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
        let id = db_id(task.id).map_err(|_| TaskError::NotUpdated)?;
        let query = format!(
            "UPDATE tasks SET description = $1, deadline = $2, completed = $3
             WHERE id = $4
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
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(db_id(id)?)
            .execute(&self.pool)
            .await
            .map_err(TaskError::storage)?;
        Ok(task)
    }
}
