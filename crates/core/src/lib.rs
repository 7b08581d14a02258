//! Taskboard domain core.
//!
//! Pure domain rules shared by the persistence, engine and HTTP layers. This
//! crate has zero internal dependencies so every other crate can use it.

pub mod error;
pub mod recurrence;
pub mod search;
pub mod task;
pub mod types;
