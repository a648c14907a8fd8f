//! Task domain layer.
//!
//! Defines the [`Task`] entity, the [`TaskRepository`] storage contract,
//! the [`TaskError`] taxonomy, and the [`TaskService`] that the HTTP layer
//! talks to. Storage adapters live in `tasks-db`; this crate knows nothing
//! about any concrete backend.

pub mod conformance;
mod error;
mod repository;
mod service;
mod task;

pub use error::{BoxError, TaskError};
pub use repository::TaskRepository;
pub use service::TaskService;
pub use task::{Task, TaskId};
