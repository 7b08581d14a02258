//! Handlers for the `/tasks` resource.
//!
//! Both edit endpoints (`PUT /tasks/{id}` and the HTMX form post) and both
//! completion endpoints call the same recurrence-engine operations; they
//! differ only in what they send back.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Form, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use taskboard_core::error::CoreError;
use taskboard_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use taskboard_core::task::{normalize_title, validate_priority, TaskEdit, TaskForm, TaskStatus};
use taskboard_core::types::DbId;
use taskboard_db::models::task::{CreateTask, Task, TaskListParams, UpdatePriority};
use taskboard_db::repositories::{TaskRepo, UserRepo};
use taskboard_mail::ReminderKind;
use taskboard_recurrence::{EditOutcome, RecurrenceEngine};

use crate::error::{AppError, AppResult};
use crate::handlers::folders::ensure_folder_owned;
use crate::middleware::auth::AuthUser;
use crate::response::{BulkResult, DataResponse, PageResponse};
use crate::state::AppState;

/// Event name HTMX clients listen on to refresh their task list.
const TASKS_CHANGED_TRIGGER: &str = "tasksChanged";

/// Request body for `POST /tasks/{id}/remind`.
#[derive(Debug, Deserialize)]
pub struct RemindRequest {
    pub reminder_type: ReminderKind,
}

/// Request body for `POST /tasks/bulk-status`.
#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    pub status: i16,
}

/// Request body for `POST /tasks/completed/move`. A missing folder moves the
/// tasks out of every folder.
#[derive(Debug, Deserialize)]
pub struct MoveCompletedRequest {
    pub folder_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The server's local calendar date.
fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn task_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Task", id })
}

/// Validate a submitted form, including ownership of the chosen folder.
async fn validated_edit(state: &AppState, user_id: DbId, form: TaskForm) -> AppResult<TaskEdit> {
    let edit = form.validated()?;
    if let Some(folder_id) = edit.folder_id {
        ensure_folder_owned(&state.pool, user_id, folder_id).await?;
    }
    Ok(edit)
}

/// Load one page of the caller's task list.
async fn load_page(
    state: &AppState,
    user_id: DbId,
    params: &TaskListParams,
) -> AppResult<PageResponse<Task>> {
    if let Some(folder_id) = params.folder_id {
        ensure_folder_owned(&state.pool, user_id, folder_id).await?;
    }

    let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = clamp_offset(params.offset);

    let data = TaskRepo::list_for_user(&state.pool, user_id, params, limit, offset).await?;
    let total = TaskRepo::count_for_user(&state.pool, user_id, params).await?;

    Ok(PageResponse {
        data,
        total,
        limit,
        offset,
    })
}

async fn apply_edit(
    state: &AppState,
    user_id: DbId,
    id: DbId,
    form: TaskForm,
) -> AppResult<EditOutcome> {
    let edit = validated_edit(state, user_id, form).await?;
    let outcome = RecurrenceEngine::apply_edit(&state.pool, user_id, id, &edit, today()).await?;
    tracing::info!(task_id = id, user_id, "Task edited");
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// GET /tasks
// ---------------------------------------------------------------------------

/// List the caller's tasks. Templates are never listed.
pub async fn list_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> AppResult<impl IntoResponse> {
    let page = load_page(&state, auth.user_id, &params).await?;
    Ok(Json(page))
}

// ---------------------------------------------------------------------------
// POST /tasks
// ---------------------------------------------------------------------------

/// Quick-add a task from a title and optional folder.
pub async fn create_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<impl IntoResponse> {
    let title = normalize_title(&input.title)?;
    if let Some(folder_id) = input.folder_id {
        ensure_folder_owned(&state.pool, auth.user_id, folder_id).await?;
    }

    let task = TaskRepo::create(&state.pool, auth.user_id, &title, input.folder_id).await?;
    tracing::info!(task_id = task.id, user_id = auth.user_id, "Task created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

// ---------------------------------------------------------------------------
// GET /tasks/{id}
// ---------------------------------------------------------------------------

pub async fn get_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = TaskRepo::find_for_user(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(Json(DataResponse { data: task }))
}

// ---------------------------------------------------------------------------
// PUT /tasks/{id}
// ---------------------------------------------------------------------------

/// Edit a task and report what the recurrence engine did.
pub async fn update_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(form): Json<TaskForm>,
) -> AppResult<impl IntoResponse> {
    let outcome = apply_edit(&state, auth.user_id, id, form).await?;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/form
// ---------------------------------------------------------------------------

/// HTMX variant of [`update_task`]: form-encoded in, `204` plus a refresh
/// trigger out.
pub async fn submit_task_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(form): Form<TaskForm>,
) -> AppResult<impl IntoResponse> {
    apply_edit(&state, auth.user_id, id, form).await?;
    Ok((StatusCode::NO_CONTENT, [("HX-Trigger", TASKS_CHANGED_TRIGGER)]))
}

// ---------------------------------------------------------------------------
// DELETE /tasks/{id}
// ---------------------------------------------------------------------------

/// Delete a task. Instances of a deleted template become standalone.
pub async fn delete_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !TaskRepo::delete_for_user(&state.pool, auth.user_id, id).await? {
        return Err(task_not_found(id));
    }
    tracing::info!(task_id = id, user_id = auth.user_id, "Task deleted");
    Ok((StatusCode::NO_CONTENT, [("HX-Trigger", TASKS_CHANGED_TRIGGER)]))
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/status
// ---------------------------------------------------------------------------

/// Toggle completion and report any spawned or superseded instance.
pub async fn toggle_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome =
        RecurrenceEngine::apply_completion_toggle(&state.pool, auth.user_id, id, today()).await?;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/status/list
// ---------------------------------------------------------------------------

/// HTMX variant of [`toggle_status`]: returns the refreshed task list.
pub async fn toggle_status_list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<TaskListParams>,
) -> AppResult<impl IntoResponse> {
    RecurrenceEngine::apply_completion_toggle(&state.pool, auth.user_id, id, today()).await?;
    let page = load_page(&state, auth.user_id, &params).await?;
    Ok(Json(page))
}

// ---------------------------------------------------------------------------
// PUT /tasks/{id}/priority
// ---------------------------------------------------------------------------

pub async fn update_priority(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePriority>,
) -> AppResult<impl IntoResponse> {
    validate_priority(input.priority)?;
    let task = TaskRepo::update_priority(&state.pool, auth.user_id, id, input.priority)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(Json(DataResponse { data: task }))
}

// ---------------------------------------------------------------------------
// POST /tasks/{id}/remind
// ---------------------------------------------------------------------------

/// Email the caller a reminder about one task.
pub async fn send_reminder(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RemindRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let task = TaskRepo::find_summary(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;

    let outcome = state
        .mailer
        .send_task_reminder_email(&user, &task, input.reminder_type)
        .await;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// POST /tasks/bulk-status
// ---------------------------------------------------------------------------

/// Complete or reopen every listed task in the requested scope.
///
/// Each task goes through the recurrence engine, so completed instances
/// spawn their successors like a single toggle would.
pub async fn bulk_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
    Json(input): Json<BulkStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let status = TaskStatus::from_id(input.status).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown status {}",
            input.status
        )))
    })?;
    if let Some(folder_id) = params.folder_id {
        ensure_folder_owned(&state.pool, auth.user_id, folder_id).await?;
    }

    let outcome = RecurrenceEngine::apply_bulk_completion(
        &state.pool,
        auth.user_id,
        params.scope(),
        status,
        today(),
    )
    .await?;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// POST /tasks/completed/move
// ---------------------------------------------------------------------------

/// Move completed, unarchived tasks in the requested scope to another folder.
pub async fn move_completed(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
    Json(input): Json<MoveCompletedRequest>,
) -> AppResult<impl IntoResponse> {
    if let Some(folder_id) = params.folder_id {
        ensure_folder_owned(&state.pool, auth.user_id, folder_id).await?;
    }
    if let Some(target) = input.folder_id {
        ensure_folder_owned(&state.pool, auth.user_id, target).await?;
    }

    let affected =
        TaskRepo::move_completed(&state.pool, auth.user_id, params.scope(), input.folder_id)
            .await?;
    tracing::info!(
        user_id = auth.user_id,
        target_folder_id = ?input.folder_id,
        affected,
        "Completed tasks moved"
    );
    Ok(Json(DataResponse {
        data: BulkResult { affected },
    }))
}

// ---------------------------------------------------------------------------
// POST /tasks/completed/archive
// ---------------------------------------------------------------------------

/// Archive completed tasks in the requested scope.
pub async fn archive_completed(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(folder_id) = params.folder_id {
        ensure_folder_owned(&state.pool, auth.user_id, folder_id).await?;
    }
    let affected = TaskRepo::archive_completed(&state.pool, auth.user_id, params.scope()).await?;
    tracing::info!(user_id = auth.user_id, affected, "Completed tasks archived");
    Ok(Json(DataResponse {
        data: BulkResult { affected },
    }))
}

// ---------------------------------------------------------------------------
// DELETE /tasks/completed
// ---------------------------------------------------------------------------

/// Delete completed tasks in the requested scope.
pub async fn delete_completed(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(folder_id) = params.folder_id {
        ensure_folder_owned(&state.pool, auth.user_id, folder_id).await?;
    }
    let affected = TaskRepo::delete_completed(&state.pool, auth.user_id, params.scope()).await?;
    tracing::info!(user_id = auth.user_id, affected, "Completed tasks deleted");
    Ok(Json(DataResponse {
        data: BulkResult { affected },
    }))
}

// ---------------------------------------------------------------------------
// POST /tasks/past-due/digest
// ---------------------------------------------------------------------------

/// Email the caller one digest of every past-due task.
pub async fn send_past_due_digest(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let tasks = TaskRepo::list_past_due(&state.pool, auth.user_id, today()).await?;
    if tasks.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "There are no past due tasks".into(),
        )));
    }

    let outcome = state.mailer.send_past_due_digest_email(&user, &tasks).await;
    Ok(Json(DataResponse { data: outcome }))
}
