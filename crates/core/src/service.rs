use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{Task, TaskError, TaskId, TaskRepository};

/// Domain service for tasks.
///
/// A thin pass-through over a [`TaskRepository`]: its job is to decouple the
/// HTTP layer from the storage technology, not to add business rules. The
/// only logic it owns is defaulting `completed` to false on creation and
/// refusing to operate without a wired repository.
pub struct TaskService {
    repo: Option<Arc<dyn TaskRepository>>,
}

impl TaskService {
    /// Build a service backed by the given repository.
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo: Some(repo) }
    }

    /// Build a service with no backing store. Every operation on it fails
    /// with [`TaskError::NoRepository`]; exists to make the misconfiguration
    /// contract observable.
    pub fn detached() -> Self {
        Self { repo: None }
    }

    fn repo(&self) -> Result<&Arc<dyn TaskRepository>, TaskError> {
        self.repo.as_ref().ok_or(TaskError::NoRepository)
    }

    /// Create and store a new task with the given description and deadline.
    /// The store assigns the id; `completed` starts out false.
    pub async fn new_task(
        &self,
        description: impl Into<String>,
        deadline: DateTime<Utc>,
    ) -> Result<Task, TaskError> {
        self.repo()?.add(Task::new(description, deadline)).await
    }

    /// All stored tasks, in undefined order.
    pub async fn get_all(&self) -> Result<Vec<Task>, TaskError> {
        self.repo()?.get_all().await
    }

    /// The task with the given id.
    pub async fn get_by_id(&self, id: TaskId) -> Result<Task, TaskError> {
        self.repo()?.get_by_id(id).await
    }

    /// Update an existing task, located by its own id.
    pub async fn update(&self, task: &Task) -> Result<Task, TaskError> {
        self.repo()?.update(task).await
    }

    /// Delete the task with the given id, returning its last stored value.
    pub async fn delete_by_id(&self, id: TaskId) -> Result<Task, TaskError> {
        self.repo()?.delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;

    /// In-memory repository used to test the service pass-through without
    /// a database.
    struct MemRepo {
        rows: Mutex<Vec<Task>>,
        next_id: Mutex<TaskId>,
    }

    impl MemRepo {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(Vec::new()),
                next_id: Mutex::new(1),
            })
        }
    }

    #[async_trait]
    impl TaskRepository for MemRepo {
        async fn get_all(&self) -> Result<Vec<Task>, TaskError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn get_by_id(&self, id: TaskId) -> Result<Task, TaskError> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or(TaskError::NotFound)
        }

        async fn add(&self, mut task: Task) -> Result<Task, TaskError> {
            let mut next = self.next_id.lock().unwrap();
            task.id = *next;
            *next += 1;
            self.rows.lock().unwrap().push(task.clone());
            Ok(task)
        }

        async fn update(&self, task: &Task) -> Result<Task, TaskError> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|t| t.id == task.id) {
                Some(row) => {
                    row.description = task.description.clone();
                    row.deadline = task.deadline;
                    row.completed = task.completed;
                    Ok(row.clone())
                }
                None => Err(TaskError::NotUpdated),
            }
        }

        async fn delete_by_id(&self, id: TaskId) -> Result<Task, TaskError> {
            let mut rows = self.rows.lock().unwrap();
            let pos = rows
                .iter()
                .position(|t| t.id == id)
                .ok_or(TaskError::NotFound)?;
            Ok(rows.remove(pos))
        }
    }

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn detached_service_fails_every_operation() {
        let svc = TaskService::detached();

        assert_matches!(svc.get_all().await, Err(TaskError::NoRepository));
        assert_matches!(svc.get_by_id(1).await, Err(TaskError::NoRepository));
        assert_matches!(
            svc.new_task("x", deadline()).await,
            Err(TaskError::NoRepository)
        );
        let task = Task::new("x", deadline());
        assert_matches!(svc.update(&task).await, Err(TaskError::NoRepository));
        assert_matches!(svc.delete_by_id(1).await, Err(TaskError::NoRepository));
    }

    #[tokio::test]
    async fn new_task_defaults_completed_and_delegates_id() {
        let svc = TaskService::new(MemRepo::new());

        let created = svc.new_task("first", deadline()).await.unwrap();
        assert_ne!(created.id, 0);
        assert!(!created.completed);
        assert_eq!(created.description, "first");
    }

    #[tokio::test]
    async fn errors_pass_through_unchanged() {
        let svc = TaskService::new(MemRepo::new());

        assert_matches!(svc.get_by_id(42).await, Err(TaskError::NotFound));
        assert_matches!(svc.delete_by_id(42).await, Err(TaskError::NotFound));

        let ghost = Task {
            id: 42,
            ..Task::new("ghost", deadline())
        };
        assert_matches!(svc.update(&ghost).await, Err(TaskError::NotUpdated));
    }

    #[tokio::test]
    async fn conformance_suite_passes_on_memory_repo() {
        crate::conformance::exercise_repository(MemRepo::new()).await;
    }
}
