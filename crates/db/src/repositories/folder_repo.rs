//! Repository for the `folders` table.

use sqlx::PgPool;
use taskboard_core::types::DbId;

use crate::models::folder::Folder;

/// Column list for `folders` queries.
const COLUMNS: &str = "id, user_id, name, created_at, updated_at";

/// Provides CRUD operations for a user's folders.
pub struct FolderRepo;

impl FolderRepo {
    /// Create a folder. `name` must already be trimmed and non-empty.
    pub async fn create(pool: &PgPool, user_id: DbId, name: &str) -> Result<Folder, sqlx::Error> {
        let query = format!(
            "INSERT INTO folders (user_id, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Folder>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Find a folder by ID, only if it belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Folder>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's folders by name.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Folder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM folders WHERE user_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Folder>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a folder. Its tasks become unfiled.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
