//! Handlers for the `/folders` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use taskboard_core::error::CoreError;
use taskboard_core::types::DbId;
use taskboard_db::models::folder::CreateFolder;
use taskboard_db::repositories::FolderRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject folder references the caller does not own.
pub(crate) async fn ensure_folder_owned(
    pool: &sqlx::PgPool,
    user_id: DbId,
    folder_id: DbId,
) -> AppResult<()> {
    FolderRepo::find_for_user(pool, user_id, folder_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Folder {folder_id} does not exist"
            )))
        })
}

// ---------------------------------------------------------------------------
// GET /folders
// ---------------------------------------------------------------------------

pub async fn list_folders(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let folders = FolderRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: folders }))
}

// ---------------------------------------------------------------------------
// POST /folders
// ---------------------------------------------------------------------------

pub async fn create_folder(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFolder>,
) -> AppResult<impl IntoResponse> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Folder name must not be empty".into(),
        )));
    }

    let folder = FolderRepo::create(&state.pool, auth.user_id, name).await?;
    tracing::info!(folder_id = folder.id, user_id = auth.user_id, "Folder created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: folder })))
}

// ---------------------------------------------------------------------------
// DELETE /folders/{id}
// ---------------------------------------------------------------------------

/// Delete a folder. Its tasks become unfiled.
pub async fn delete_folder(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if FolderRepo::delete(&state.pool, auth.user_id, id).await? {
        tracing::info!(folder_id = id, user_id = auth.user_id, "Folder deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Folder",
            id,
        }))
    }
}
