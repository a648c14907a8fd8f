use async_trait::async_trait;

use crate::{Task, TaskError, TaskId};

/// Any data store that can store tasks.
///
/// Implementations translate their backend-native errors into [`TaskError`]
/// before returning; callers never see a raw backend error type.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Get all tasks, in undefined order. An empty store is `Ok(vec![])`,
    /// never an error.
    async fn get_all(&self) -> Result<Vec<Task>, TaskError>;

    /// Get the task with the given id, or [`TaskError::NotFound`].
    async fn get_by_id(&self, id: TaskId) -> Result<Task, TaskError>;

    /// Store a new task, returning it with a fresh store-assigned id.
    /// Any id carried by `task` is ignored.
    async fn add(&self, task: Task) -> Result<Task, TaskError>;

    /// Update the task identified by `task.id`, writing only description,
    /// deadline and completed. Fails with [`TaskError::NotUpdated`] when no
    /// row matches the id.
    async fn update(&self, task: &Task) -> Result<Task, TaskError>;

    /// Delete the task with the given id and return its value as it was
    /// immediately before deletion, or [`TaskError::NotFound`].
    async fn delete_by_id(&self, id: TaskId) -> Result<Task, TaskError>;
}
