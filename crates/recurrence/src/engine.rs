//! Transactional orchestration of the recurrence lifecycle.
//!
//! Every operation on a single task runs in one transaction. When the task is an instance,
//! its template row is locked first, then the task itself, so concurrent
//! operations on sibling instances serialize on the template.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use taskboard_core::error::CoreError;
use taskboard_core::task::{TaskEdit, TaskRole, TaskStatus};
use taskboard_core::types::DbId;
use taskboard_db::models::task::{Task, TaskScope};
use taskboard_db::repositories::TaskRepo;

use crate::error::EngineError;
use crate::outcome::{BulkCompletionOutcome, CompletionOutcome, EditOutcome};
use crate::rules;

/// Stateless entry point for the lifecycle operations.
pub struct RecurrenceEngine;

/// A task locked for the rest of the transaction, with its template when
/// it is an instance.
struct Locked {
    task: Task,
    template: Option<Task>,
}

impl RecurrenceEngine {
    /// Apply a validated edit to one of `user_id`'s tasks.
    ///
    /// Instances carry their changes to the template; clearing recurrence on
    /// an instance dissolves the template. Standalone tasks and templates
    /// gain, keep, or lose recurrence according to `edit.recurrence`.
    pub async fn apply_edit(
        pool: &PgPool,
        user_id: DbId,
        task_id: DbId,
        edit: &TaskEdit,
        today: NaiveDate,
    ) -> Result<EditOutcome, EngineError> {
        let mut tx = pool.begin().await?;
        let Locked { task, template } = lock_task(&mut tx, user_id, task_id).await?;

        let outcome = match template {
            Some(template) => edit_instance(&mut tx, task, template, edit, today).await?,
            None => edit_template_or_standalone(&mut tx, task, edit, today).await?,
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Toggle completion of one of `user_id`'s tasks.
    ///
    /// Completing the active instance of a recurring template spawns the next
    /// instance, due `today`, unless another pending instance already exists.
    pub async fn apply_completion_toggle(
        pool: &PgPool,
        user_id: DbId,
        task_id: DbId,
        today: NaiveDate,
    ) -> Result<CompletionOutcome, EngineError> {
        change_completion(pool, user_id, task_id, None, today)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!("Toggling task {task_id} changed nothing")).into()
            })
    }

    /// Set one task's completion to `status`, with the same side effects as
    /// [`RecurrenceEngine::apply_completion_toggle`]. Returns `None` when the
    /// task already had `status`.
    pub async fn apply_completion(
        pool: &PgPool,
        user_id: DbId,
        task_id: DbId,
        status: TaskStatus,
        today: NaiveDate,
    ) -> Result<Option<CompletionOutcome>, EngineError> {
        change_completion(pool, user_id, task_id, Some(status), today).await
    }

    /// Set every listed task in `scope` to `status`.
    ///
    /// Each task goes through [`RecurrenceEngine::apply_completion`] in its
    /// own transaction, so completed instances spawn their successors and
    /// reopened instances supersede their siblings. Tasks deleted, re-parented
    /// or turned into templates meanwhile are skipped.
    pub async fn apply_bulk_completion(
        pool: &PgPool,
        user_id: DbId,
        scope: TaskScope,
        status: TaskStatus,
        today: NaiveDate,
    ) -> Result<BulkCompletionOutcome, EngineError> {
        let ids =
            TaskRepo::list_ids_with_status(pool, user_id, scope, status.toggled().id()).await?;

        let mut outcome = BulkCompletionOutcome::default();
        for id in ids {
            let changed = match Self::apply_completion(pool, user_id, id, status, today).await {
                Ok(Some(changed)) => changed,
                Ok(None) => continue,
                Err(EngineError::Core(
                    err @ (CoreError::NotFound { .. } | CoreError::Conflict(_)),
                )) => {
                    tracing::debug!(task_id = id, error = %err, "Task skipped by bulk completion");
                    continue;
                }
                Err(e) => return Err(e),
            };
            outcome.affected += 1;
            outcome.spawned_ids.extend(changed.spawned.map(|t| t.id));
            outcome
                .superseded_instance_ids
                .extend(changed.superseded_instance_ids);
        }

        tracing::info!(
            user_id,
            status = ?status,
            affected = outcome.affected,
            spawned = outcome.spawned_ids.len(),
            "Bulk completion applied",
        );
        Ok(outcome)
    }
}

/// Move one task to `target` (or its opposite status when `None`).
///
/// `None` is returned, and nothing written, when the task is already there.
async fn change_completion(
    pool: &PgPool,
    user_id: DbId,
    task_id: DbId,
    target: Option<TaskStatus>,
    today: NaiveDate,
) -> Result<Option<CompletionOutcome>, EngineError> {
    let mut tx = pool.begin().await?;
    let Locked { mut task, template } = lock_task(&mut tx, user_id, task_id).await?;
    rules::ensure_completable(&task)?;

    let status = target.unwrap_or_else(|| task.status().toggled());
    if !rules::apply_status(&mut task, status, today) {
        tx.rollback().await?;
        return Ok(None);
    }

    let superseded_instance_ids = match (&template, status) {
        (Some(template), TaskStatus::Pending) if rules::is_active_instance(&task) => {
            TaskRepo::archive_pending_instances(&mut *tx, template.id, task.id).await?
        }
        _ => Vec::new(),
    };
    let task = TaskRepo::update(&mut *tx, &task).await?;

    let spawned = match (&template, status) {
        (Some(template), TaskStatus::Complete) => {
            spawn_next(&mut tx, template, task.id, today).await?
        }
        _ => None,
    };

    tx.commit().await?;

    tracing::info!(
        task_id = task.id,
        user_id,
        status = ?status,
        spawned_id = spawned.as_ref().map(|t| t.id),
        superseded = superseded_instance_ids.len(),
        "Task completion changed",
    );

    Ok(Some(CompletionOutcome {
        task,
        spawned,
        superseded_instance_ids,
    }))
}

// ---------------------------------------------------------------------------
// Locking
// ---------------------------------------------------------------------------

/// Lock the template (if any) and then the task.
///
/// The parent reference is read once without a lock to learn which template
/// to lock, then re-checked under the lock. A mismatch means another
/// transaction re-parented the task in between.
async fn lock_task(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
    task_id: DbId,
) -> Result<Locked, EngineError> {
    let not_found = || CoreError::NotFound {
        entity: "Task",
        id: task_id,
    };

    let peek = TaskRepo::find_for_user(&mut **tx, user_id, task_id)
        .await?
        .ok_or_else(not_found)?;

    let template_id = match peek.role() {
        TaskRole::Instance { template_id } => Some(template_id),
        TaskRole::Template | TaskRole::Standalone => None,
    };

    let template = match template_id {
        Some(id) => TaskRepo::lock_by_id(&mut **tx, id).await?,
        None => None,
    };

    let task = TaskRepo::lock_by_id(&mut **tx, task_id)
        .await?
        .ok_or_else(not_found)?;

    if task.parent_task_id != template_id || (template_id.is_some() && template.is_none()) {
        return Err(CoreError::Conflict(format!(
            "Task {task_id} changed while it was being updated; retry the request"
        ))
        .into());
    }

    Ok(Locked { task, template })
}

// ---------------------------------------------------------------------------
// Edit paths
// ---------------------------------------------------------------------------

/// Edit an instance and push the shared fields to its template.
async fn edit_instance(
    tx: &mut Transaction<'_, Postgres>,
    mut task: Task,
    mut template: Task,
    edit: &TaskEdit,
    today: NaiveDate,
) -> Result<EditOutcome, EngineError> {
    rules::apply_form_fields(&mut task, edit);
    let reopened = match edit.status {
        Some(status) => rules::apply_status(&mut task, status, today) && task.is_pending(),
        None => false,
    };

    let Some(kind) = edit.recurrence else {
        // Recurrence cleared: dissolve the template.
        task.parent_task_id = None;
        let task = TaskRepo::update(&mut **tx, &task).await?;
        let detached = TaskRepo::detach_instances(&mut **tx, template.id).await?;
        if template.role() != TaskRole::Template {
            // The parent stopped recurring and is an ordinary task now.
            tracing::warn!(
                task_id = task.id,
                parent_id = template.id,
                "Instance parent is not a template, detached without deleting it",
            );
            return Ok(EditOutcome::Updated { task });
        }
        TaskRepo::delete(&mut **tx, template.id).await?;

        tracing::info!(
            task_id = task.id,
            template_id = template.id,
            detached_siblings = detached,
            "Recurrence cleared on instance, template deleted",
        );

        return Ok(EditOutcome::InstanceDetached {
            task,
            deleted_template_id: template.id,
        });
    };

    let superseded_instance_ids = if reopened && rules::is_active_instance(&task) {
        TaskRepo::archive_pending_instances(&mut **tx, template.id, task.id).await?
    } else {
        Vec::new()
    };
    let instance = TaskRepo::update(&mut **tx, &task).await?;

    rules::sync_template_from_instance(&mut template, &instance);
    rules::set_template_recurrence(&mut template, kind, instance.due_date);
    let template = TaskRepo::update(&mut **tx, &template).await?;

    tracing::debug!(
        task_id = instance.id,
        template_id = template.id,
        recurrence = %kind,
        "Instance edit propagated to template",
    );

    Ok(EditOutcome::InstanceUpdated {
        instance,
        template,
        superseded_instance_ids,
    })
}

/// Edit a standalone task or a template, switching recurrence on or off.
async fn edit_template_or_standalone(
    tx: &mut Transaction<'_, Postgres>,
    mut task: Task,
    edit: &TaskEdit,
    today: NaiveDate,
) -> Result<EditOutcome, EngineError> {
    let was_recurring = task.is_recurring;

    rules::apply_form_fields(&mut task, edit);
    if let Some(status) = edit.status {
        rules::apply_status(&mut task, status, today);
    }
    rules::configure_recurrence(&mut task, edit.recurrence);
    rules::ensure_template_pending(&task)?;

    let task = TaskRepo::update(&mut **tx, &task).await?;

    match (was_recurring, task.is_recurring) {
        (false, true) => enable_recurrence(tx, task, today).await,
        (true, true) => {
            let synced_instance = sync_pending_instance(tx, &task).await?;
            if synced_instance.is_none() {
                tracing::debug!(
                    template_id = task.id,
                    "Template edited with no pending instance; waiting for next completion",
                );
            }
            Ok(EditOutcome::TemplateUpdated {
                template: task,
                synced_instance,
            })
        }
        (true, false) => {
            let detached = TaskRepo::detach_instances(&mut **tx, task.id).await?;
            tracing::info!(
                task_id = task.id,
                detached_instances = detached,
                "Recurrence disabled on template, instances detached",
            );
            Ok(EditOutcome::Updated { task })
        }
        (false, false) => Ok(EditOutcome::Updated { task }),
    }
}

/// A task just became a template: give it its first instance.
///
/// A pending instance left over from an earlier recurring period is reused
/// instead of spawning a second one.
async fn enable_recurrence(
    tx: &mut Transaction<'_, Postgres>,
    template: Task,
    today: NaiveDate,
) -> Result<EditOutcome, EngineError> {
    if let Some(instance) = sync_pending_instance(tx, &template).await? {
        tracing::info!(
            template_id = template.id,
            instance_id = instance.id,
            "Recurrence re-enabled, existing instance reused",
        );
        return Ok(EditOutcome::RecurrenceEnabled {
            template,
            instance,
            spawned: false,
        });
    }

    let instance = TaskRepo::create_instance(&mut **tx, &rules::first_instance(&template)).await?;
    let template = TaskRepo::mark_generated(&mut **tx, template.id, today).await?;

    tracing::info!(
        template_id = template.id,
        instance_id = instance.id,
        recurrence = template.recurrence_type.as_deref().unwrap_or_default(),
        "Recurrence enabled, first instance created",
    );

    Ok(EditOutcome::RecurrenceEnabled {
        template,
        instance,
        spawned: true,
    })
}

/// Copy the template's shared fields onto its latest pending instance.
async fn sync_pending_instance(
    tx: &mut Transaction<'_, Postgres>,
    template: &Task,
) -> Result<Option<Task>, EngineError> {
    let Some(mut instance) = TaskRepo::latest_pending_instance(&mut **tx, template.id).await?
    else {
        return Ok(None);
    };
    rules::sync_instance_from_template(&mut instance, template);
    Ok(Some(TaskRepo::update(&mut **tx, &instance).await?))
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Spawn the next instance after `completed_id` was completed.
///
/// Nothing happens when the template no longer recurs, is archived, or
/// already has another pending instance.
async fn spawn_next(
    tx: &mut Transaction<'_, Postgres>,
    template: &Task,
    completed_id: DbId,
    today: NaiveDate,
) -> Result<Option<Task>, EngineError> {
    if !rules::accepts_instances(template) {
        tracing::debug!(template_id = template.id, "Template inactive, no instance spawned");
        return Ok(None);
    }
    if TaskRepo::has_pending_instance(&mut **tx, template.id, Some(completed_id)).await? {
        tracing::debug!(
            template_id = template.id,
            "Template already has a pending instance, no instance spawned",
        );
        return Ok(None);
    }

    let instance = TaskRepo::create_instance(&mut **tx, &rules::next_instance(template, today)).await?;
    TaskRepo::mark_generated(&mut **tx, template.id, today).await?;
    Ok(Some(instance))
}
