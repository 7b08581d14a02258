pub mod folders;
pub mod health;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tasks                                  list, quick-add
/// /tasks/bulk-status                      complete or reopen all in scope (POST)
/// /tasks/completed                        delete completed (DELETE)
/// /tasks/completed/archive                archive completed (POST)
/// /tasks/completed/move                   move completed to a folder (POST)
/// /tasks/past-due/digest                  email past-due digest (POST)
/// /tasks/{id}                             get, edit (PUT), delete
/// /tasks/{id}/form                        HTMX edit (POST)
/// /tasks/{id}/status                      toggle completion (POST)
/// /tasks/{id}/status/list                 toggle completion, return list (POST)
/// /tasks/{id}/priority                    set priority (PUT)
/// /tasks/{id}/remind                      email a reminder (POST)
///
/// /folders                                list, create
/// /folders/{id}                           delete
/// ```
///
/// Every route requires a bearer token and is scoped to its owner.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tasks", tasks::router())
        .nest("/folders", folders::router())
}
