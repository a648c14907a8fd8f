use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task ids are unsigned and assigned by the storage backend. A freshly
/// constructed, not-yet-stored task carries id 0, which no backend ever
/// assigns.
pub type TaskId = u64;

/// A single task.
///
/// JSON field names match the wire format of the REST API: `id`,
/// `description`, `deadline` (RFC 3339 timestamp), `completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub completed: bool,
}

impl Task {
    /// Build a task that has not been stored yet: id 0, not completed.
    pub fn new(description: impl Into<String>, deadline: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            description: description.into(),
            deadline,
            completed: false,
        }
    }
}
