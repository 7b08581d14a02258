//! Route definitions for the `/tasks` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                      -> list_tasks  (?folder_id, all, include_archived, limit, offset)
/// POST   /                      -> create_task
/// POST   /bulk-status           -> bulk_status       (?folder_id, all)
/// DELETE /completed             -> delete_completed  (?folder_id, all)
/// POST   /completed/archive     -> archive_completed (?folder_id, all)
/// POST   /completed/move        -> move_completed    (?folder_id, all)
/// POST   /past-due/digest       -> send_past_due_digest
/// GET    /{id}                  -> get_task
/// PUT    /{id}                  -> update_task
/// DELETE /{id}                  -> delete_task
/// POST   /{id}/form             -> submit_task_form
/// POST   /{id}/status           -> toggle_status
/// POST   /{id}/status/list      -> toggle_status_list
/// PUT    /{id}/priority         -> update_priority
/// POST   /{id}/remind           -> send_reminder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/bulk-status", post(tasks::bulk_status))
        .route("/completed", delete(tasks::delete_completed))
        .route("/completed/archive", post(tasks::archive_completed))
        .route("/completed/move", post(tasks::move_completed))
        .route("/past-due/digest", post(tasks::send_past_due_digest))
        .route(
            "/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/{id}/form", post(tasks::submit_task_form))
        .route("/{id}/status", post(tasks::toggle_status))
        .route("/{id}/status/list", post(tasks::toggle_status_list))
        .route("/{id}/priority", put(tasks::update_priority))
        .route("/{id}/remind", post(tasks::send_reminder))
}
