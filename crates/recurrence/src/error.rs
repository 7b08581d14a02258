use taskboard_core::error::CoreError;

/// Errors raised while applying a recurrence operation.
///
/// Any error aborts the surrounding transaction, so none of the operation's
/// writes are committed.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
