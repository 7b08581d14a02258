//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Methods used inside recurrence transactions accept any `PgExecutor`;
//! the rest take `&PgPool`.

pub mod folder_repo;
pub mod task_repo;
pub mod user_repo;

pub use folder_repo::FolderRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
