//! Domain errors shared by every taskboard crate.

use crate::types::DbId;

/// A task, folder or user operation that could not proceed.
///
/// The HTTP layer maps each variant to one status code, so the variant is
/// chosen by what the caller can do about it.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The row does not exist or belongs to another user.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A submitted field is out of range or malformed.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The task's current state forbids the operation, e.g. completing a
    /// recurring template, or a concurrent edit re-parented it.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the operation is not open to this user.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Broken invariant; the message is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}
