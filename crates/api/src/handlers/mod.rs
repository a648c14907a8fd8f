//! HTTP request handlers.

pub mod health;
pub mod tasks;
