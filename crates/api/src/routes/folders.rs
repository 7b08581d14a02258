//! Route definitions for the `/folders` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::folders;
use crate::state::AppState;

/// Routes mounted at `/folders`.
///
/// ```text
/// GET    /        -> list_folders
/// POST   /        -> create_folder
/// DELETE /{id}    -> delete_folder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(folders::list_folders).post(folders::create_folder))
        .route("/{id}", delete(folders::delete_folder))
}
