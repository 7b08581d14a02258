//! Repository for the `tasks` table.
//!
//! Methods that take part in recurrence-engine transactions are generic over
//! [`PgExecutor`], so they run equally against the pool or against
//! `&mut *tx` inside a transaction.

use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use taskboard_core::types::DbId;

use crate::models::task::{NewInstance, Task, TaskListParams, TaskScope, TaskSummary};

/// Column list for `tasks` queries.
const COLUMNS: &str = "\
    id, user_id, folder_id, title, priority, status_id, \
    due_date, due_time, completed_date, archived, \
    is_recurring, recurrence_type, recurrence_day, recurrence_month, \
    last_generated, parent_task_id, created_at, updated_at";

/// Column list for [`TaskSummary`] queries (`t` = tasks, `f` = folders).
const SUMMARY_COLUMNS: &str = "t.id, t.title, t.due_date, t.due_time, f.name AS folder_name";

/// Provides CRUD and recurrence queries for tasks.
pub struct TaskRepo;

impl TaskRepo {
    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Quick-add a task. `title` must already be normalized.
    pub async fn create<'e, E>(
        executor: E,
        user_id: DbId,
        title: &str,
        folder_id: Option<DbId>,
    ) -> Result<Task, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO tasks (user_id, title, folder_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .bind(title)
            .bind(folder_id)
            .fetch_one(executor)
            .await
    }

    /// Insert a pending instance of a template.
    pub async fn create_instance<'e, E>(
        executor: E,
        input: &NewInstance,
    ) -> Result<Task, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO tasks \
                (user_id, folder_id, title, priority, status_id, \
                 due_date, due_time, parent_task_id) \
             VALUES ($1, $2, $3, $4, 0, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.user_id)
            .bind(input.folder_id)
            .bind(&input.title)
            .bind(input.priority)
            .bind(input.due_date)
            .bind(input.due_time)
            .bind(input.parent_task_id)
            .fetch_one(executor)
            .await
    }

    // -----------------------------------------------------------------------
    // Read
    // -----------------------------------------------------------------------

    /// Find a task by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Task>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a task by ID, only if it belongs to `user_id`.
    pub async fn find_for_user<'e, E>(
        executor: E,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Load a task and hold a row lock on it until the transaction ends.
    pub async fn lock_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Task>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The most recent active instance of a template.
    ///
    /// Ordered by due date descending (undated instances last), then newest
    /// first.
    pub async fn latest_pending_instance<'e, E>(
        executor: E,
        template_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks \
             WHERE parent_task_id = $1 AND status_id = 0 AND NOT archived \
             ORDER BY due_date DESC NULLS LAST, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(template_id)
            .fetch_optional(executor)
            .await
    }

    /// Whether the template has an active instance other than `exclude_id`.
    pub async fn has_pending_instance<'e, E>(
        executor: E,
        template_id: DbId,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM tasks \
                WHERE parent_task_id = $1 AND status_id = 0 AND NOT archived \
                  AND ($2::BIGINT IS NULL OR id <> $2) \
             )",
        )
        .bind(template_id)
        .bind(exclude_id)
        .fetch_one(executor)
        .await
    }

    /// List a user's tasks in `params.scope()`, templates excluded.
    ///
    /// Pending tasks come first, then by priority and due date.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        params: &TaskListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let scope = params.scope();
        let where_clause = list_where_clause(scope, params.include_archived);
        let param_idx = if matches!(scope, TaskScope::Folder(_)) { 3 } else { 2 };

        let query = format!(
            "SELECT {COLUMNS} FROM tasks {where_clause} \
             ORDER BY status_id ASC, priority ASC, due_date ASC NULLS LAST, id ASC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(user_id);
        if let TaskScope::Folder(folder_id) = scope {
            q = q.bind(folder_id);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count the rows [`TaskRepo::list_for_user`] would page through.
    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        params: &TaskListParams,
    ) -> Result<i64, sqlx::Error> {
        let scope = params.scope();
        let where_clause = list_where_clause(scope, params.include_archived);
        let query = format!("SELECT COUNT(*) FROM tasks {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(user_id);
        if let TaskScope::Folder(folder_id) = scope {
            q = q.bind(folder_id);
        }
        q.fetch_one(pool).await
    }

    /// Pending, non-archived, dated tasks that are past due on `today`.
    pub async fn list_past_due(
        pool: &PgPool,
        user_id: DbId,
        today: NaiveDate,
    ) -> Result<Vec<TaskSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM tasks t \
             LEFT JOIN folders f ON f.id = t.folder_id \
             WHERE t.user_id = $1 AND t.status_id = 0 AND NOT t.archived \
               AND NOT t.is_recurring AND t.due_date < $2 \
             ORDER BY t.due_date ASC, t.id ASC"
        );
        sqlx::query_as::<_, TaskSummary>(&query)
            .bind(user_id)
            .bind(today)
            .fetch_all(pool)
            .await
    }

    /// A single task with its folder name, scoped to the owner.
    pub async fn find_summary(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<TaskSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM tasks t \
             LEFT JOIN folders f ON f.id = t.folder_id \
             WHERE t.id = $1 AND t.user_id = $2"
        );
        sqlx::query_as::<_, TaskSummary>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Write every mutable column of `task` back to its row.
    pub async fn update<'e, E>(executor: E, task: &Task) -> Result<Task, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE tasks SET \
                folder_id = $2, title = $3, priority = $4, status_id = $5, \
                due_date = $6, due_time = $7, completed_date = $8, archived = $9, \
                is_recurring = $10, recurrence_type = $11, recurrence_day = $12, \
                recurrence_month = $13, last_generated = $14, parent_task_id = $15, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(task.id)
            .bind(task.folder_id)
            .bind(&task.title)
            .bind(task.priority)
            .bind(task.status_id)
            .bind(task.due_date)
            .bind(task.due_time)
            .bind(task.completed_date)
            .bind(task.archived)
            .bind(task.is_recurring)
            .bind(&task.recurrence_type)
            .bind(task.recurrence_day)
            .bind(task.recurrence_month)
            .bind(task.last_generated)
            .bind(task.parent_task_id)
            .fetch_one(executor)
            .await
    }

    /// Stamp the date a template last spawned an instance.
    pub async fn mark_generated<'e, E>(
        executor: E,
        template_id: DbId,
        on: NaiveDate,
    ) -> Result<Task, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE tasks SET last_generated = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(template_id)
            .bind(on)
            .fetch_one(executor)
            .await
    }

    /// Archive every active instance of a template except `keep_id`.
    ///
    /// Returns the IDs of the archived instances.
    pub async fn archive_pending_instances<'e, E>(
        executor: E,
        template_id: DbId,
        keep_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, DbId>(
            "UPDATE tasks SET archived = true, updated_at = now() \
             WHERE parent_task_id = $1 AND status_id = 0 AND NOT archived AND id <> $2 \
             RETURNING id",
        )
        .bind(template_id)
        .bind(keep_id)
        .fetch_all(executor)
        .await
    }

    /// Turn every instance of a template into a standalone task.
    pub async fn detach_instances<'e, E>(executor: E, template_id: DbId) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE tasks SET parent_task_id = NULL, updated_at = now() \
             WHERE parent_task_id = $1",
        )
        .bind(template_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Set the priority of a user's task. Returns `None` if not found.
    pub async fn update_priority(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        priority: i16,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET priority = $3, updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .bind(priority)
            .fetch_optional(pool)
            .await
    }

    /// Archive the completed tasks in `scope`. Returns the number archived.
    pub async fn archive_completed(
        pool: &PgPool,
        user_id: DbId,
        scope: TaskScope,
    ) -> Result<u64, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET archived = true, updated_at = now() {}",
            completed_where_clause(scope)
        );
        let mut q = sqlx::query(&query).bind(user_id);
        if let TaskScope::Folder(folder_id) = scope {
            q = q.bind(folder_id);
        }
        Ok(q.execute(pool).await?.rows_affected())
    }

    /// Move the visible completed tasks in `scope` into `target`
    /// (`None` = unfiled). Returns the number moved.
    pub async fn move_completed(
        pool: &PgPool,
        user_id: DbId,
        scope: TaskScope,
        target: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let target_idx = if matches!(scope, TaskScope::Folder(_)) { 3 } else { 2 };
        let query = format!(
            "UPDATE tasks SET folder_id = ${target_idx}, updated_at = now() {} AND archived = false",
            completed_where_clause(scope)
        );
        let mut q = sqlx::query(&query).bind(user_id);
        if let TaskScope::Folder(folder_id) = scope {
            q = q.bind(folder_id);
        }
        Ok(q.bind(target).execute(pool).await?.rows_affected())
    }

    /// IDs of the listed (non-template, unarchived) tasks in `scope` whose
    /// status is `status_id`, oldest first.
    pub async fn list_ids_with_status(
        pool: &PgPool,
        user_id: DbId,
        scope: TaskScope,
        status_id: i16,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let status_idx = if matches!(scope, TaskScope::Folder(_)) { 3 } else { 2 };
        let query = format!(
            "SELECT id FROM tasks {} AND status_id = ${status_idx} ORDER BY id",
            list_where_clause(scope, false)
        );
        let mut q = sqlx::query_scalar::<_, DbId>(&query).bind(user_id);
        if let TaskScope::Folder(folder_id) = scope {
            q = q.bind(folder_id);
        }
        q.bind(status_id).fetch_all(pool).await
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Delete a task by ID. Returns `true` if a row was removed.
    pub async fn delete<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user's task. Instances of a deleted template become standalone.
    pub async fn delete_for_user(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the completed tasks in `scope`. Returns the number deleted.
    pub async fn delete_completed(
        pool: &PgPool,
        user_id: DbId,
        scope: TaskScope,
    ) -> Result<u64, sqlx::Error> {
        let query = format!("DELETE FROM tasks {}", completed_where_clause(scope));
        let mut q = sqlx::query(&query).bind(user_id);
        if let TaskScope::Folder(folder_id) = scope {
            q = q.bind(folder_id);
        }
        Ok(q.execute(pool).await?.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Scope condition; a folder scope binds its ID as `$2`.
fn scope_condition(scope: TaskScope) -> Option<&'static str> {
    match scope {
        TaskScope::All => None,
        TaskScope::Folder(_) => Some("folder_id = $2"),
        TaskScope::Unfiled => Some("folder_id IS NULL"),
    }
}

/// `WHERE` clause for task lists. `$1` is the user ID.
fn list_where_clause(scope: TaskScope, include_archived: bool) -> String {
    let mut conditions = vec!["user_id = $1", "is_recurring = false"];
    if let Some(c) = scope_condition(scope) {
        conditions.push(c);
    }
    if !include_archived {
        conditions.push("archived = false");
    }
    format!("WHERE {}", conditions.join(" AND "))
}

/// `WHERE` clause for bulk operations on completed tasks. `$1` is the user ID.
fn completed_where_clause(scope: TaskScope) -> String {
    let mut conditions = vec!["user_id = $1", "status_id = 1"];
    if let Some(c) = scope_condition(scope) {
        conditions.push(c);
    }
    format!("WHERE {}", conditions.join(" AND "))
}
