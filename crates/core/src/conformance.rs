//! Reusable conformance suite for [`TaskRepository`] implementations.
//!
//! Storage adapters live in other crates; each of them runs
//! [`exercise_repository`] against a freshly created, empty store to prove
//! it honours the repository contract. The suite drives the repository
//! through [`TaskService`], so the pass-through layer is exercised too.

use std::sync::Arc;

use chrono::{Duration, SubsecRound, Utc};

use crate::{Task, TaskError, TaskRepository, TaskService};

/// Run the full contract suite against `repo`. Panics on the first violated
/// property.
///
/// The store behind `repo` must be empty: the suite assumes the ids it
/// creates are the only ones present and that id 255 is unassigned.
pub async fn exercise_repository(repo: Arc<dyn TaskRepository>) {
    let service = TaskService::new(repo);

    // Deadlines truncated to whole seconds so they round-trip identically
    // through every backend's timestamp encoding.
    let first_deadline = (Utc::now() + Duration::days(15)).trunc_subsecs(0);
    let second_deadline = (Utc::now() + Duration::days(10)).trunc_subsecs(0);

    let first = service
        .new_task("First Task", first_deadline)
        .await
        .expect("creating the first task must succeed");
    assert_ne!(first.id, 0, "store must assign a non-zero id");
    assert!(!first.completed, "a new task must not be completed");

    let second = service
        .new_task("Second Task", second_deadline)
        .await
        .expect("creating the second task must succeed");
    assert_ne!(second.id, 0, "store must assign a non-zero id");
    assert_ne!(second.id, first.id, "assigned ids must be unique");

    let all = service.get_all().await.expect("get_all must succeed");
    assert_eq!(all.len(), 2, "both tasks must be listed");
    assert!(all.iter().any(|t| t.id == first.id));
    assert!(all.iter().any(|t| t.id == second.id));

    let fetched = service
        .get_by_id(second.id)
        .await
        .expect("stored task must be retrievable");
    assert_eq!(fetched, second, "fetched task must equal the stored value");
    assert_eq!(fetched.description, "Second Task");

    let err = service
        .get_by_id(255)
        .await
        .expect_err("an unassigned id must not resolve");
    assert!(
        matches!(err, TaskError::NotFound),
        "expected NotFound, got: {err}"
    );

    // Mark the second task completed; only the three mutable fields may
    // change and the id must be invariant.
    let mut updated = fetched.clone();
    updated.completed = true;
    let returned = service
        .update(&updated)
        .await
        .expect("updating an existing task must succeed");
    assert_eq!(returned.id, second.id, "update must never change the id");
    assert!(returned.completed, "completed flag must be written");
    assert_eq!(returned.description, second.description);
    assert_eq!(returned.deadline, second.deadline);

    let refetched = service
        .get_by_id(second.id)
        .await
        .expect("updated task must still resolve");
    assert!(refetched.completed, "update must be visible on re-read");
    assert_eq!(refetched.description, second.description);
    assert_eq!(refetched.deadline, second.deadline);

    let ghost = Task {
        id: 255,
        ..Task::new("ghost", first_deadline)
    };
    let err = service
        .update(&ghost)
        .await
        .expect_err("updating an unassigned id must fail");
    assert!(
        matches!(err, TaskError::NotUpdated),
        "expected NotUpdated, got: {err}"
    );

    let err = service
        .delete_by_id(255)
        .await
        .expect_err("deleting an unassigned id must fail");
    assert!(
        matches!(err, TaskError::NotFound),
        "expected NotFound, got: {err}"
    );

    let deleted = service
        .delete_by_id(second.id)
        .await
        .expect("deleting an existing task must succeed");
    assert_eq!(
        deleted, refetched,
        "delete must return the pre-deletion value"
    );

    let err = service
        .get_by_id(second.id)
        .await
        .expect_err("a deleted id must never resolve again");
    assert!(
        matches!(err, TaskError::NotFound),
        "expected NotFound, got: {err}"
    );

    let err = service
        .delete_by_id(second.id)
        .await
        .expect_err("double delete must fail");
    assert!(
        matches!(err, TaskError::NotFound),
        "expected NotFound, got: {err}"
    );

    let remaining = service.get_all().await.expect("get_all must succeed");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, first.id);
}
