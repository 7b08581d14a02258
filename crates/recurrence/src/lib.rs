//! Recurring-task lifecycle engine.
//!
//! A recurring *template* holds the rule; at most one pending *instance* of
//! it is active at a time. [`RecurrenceEngine`] applies the two task
//! mutations that drive the lifecycle (editing a task and toggling its
//! completion) inside a single transaction each.
//!
//! The field-level rules live in [`rules`] as pure functions over
//! [`Task`](taskboard_db::models::task::Task) rows so they can be tested
//! without a database.

pub mod engine;
pub mod error;
pub mod outcome;
pub mod rules;

pub use engine::RecurrenceEngine;
pub use error::EngineError;
pub use outcome::{BulkCompletionOutcome, CompletionOutcome, EditOutcome};
