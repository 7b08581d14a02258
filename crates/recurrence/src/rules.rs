//! Pure field rules applied by the engine.
//!
//! Every function here mutates or reads in-memory [`Task`] rows only. The
//! engine decides which rules run and persists the results.

use chrono::NaiveDate;
use taskboard_core::error::CoreError;
use taskboard_core::recurrence::{derive_fields, RecurrenceFields, RecurrenceType};
use taskboard_core::task::{TaskEdit, TaskRole, TaskStatus};
use taskboard_db::models::task::{NewInstance, Task};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Set `status`, maintaining `completed_date`.
///
/// Returns `false` when the task already had that status, in which case
/// nothing changes.
pub fn apply_status(task: &mut Task, status: TaskStatus, today: NaiveDate) -> bool {
    if task.status() == status {
        return false;
    }
    task.status_id = status.id();
    task.completed_date = match status {
        TaskStatus::Complete => Some(today),
        TaskStatus::Pending => None,
    };
    true
}

/// Templates are never completed directly; their instances are.
pub fn ensure_completable(task: &Task) -> Result<(), CoreError> {
    if task.role() == TaskRole::Template {
        return Err(CoreError::Conflict(format!(
            "Task {} is a recurring template; complete its current instance instead",
            task.id
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// Copy the directly editable fields (everything but status and recurrence).
pub fn apply_form_fields(task: &mut Task, edit: &TaskEdit) {
    task.folder_id = edit.folder_id;
    task.title.clone_from(&edit.title);
    task.priority = edit.priority;
    task.due_date = edit.due_date;
    task.due_time = edit.due_time;
}

/// Turn recurrence on or off on a standalone task or template.
///
/// On: the task becomes a template and its day/month are derived from its
/// due date. Off: all recurrence fields are cleared.
pub fn configure_recurrence(task: &mut Task, recurrence: Option<RecurrenceType>) {
    match recurrence {
        Some(kind) => {
            let due_date = task.due_date;
            set_template_recurrence(task, kind, due_date);
        }
        None => {
            task.is_recurring = false;
            task.recurrence_type = None;
            task.recurrence_day = None;
            task.recurrence_month = None;
        }
    }
}

/// Set a template's rule, deriving day/month from `due_date`.
///
/// Instances pass their own due date here; templates pass theirs.
pub fn set_template_recurrence(
    template: &mut Task,
    kind: RecurrenceType,
    due_date: Option<NaiveDate>,
) {
    let RecurrenceFields { day, month } =
        derive_fields(kind, due_date, template.recurrence_fields());
    template.is_recurring = true;
    template.recurrence_type = Some(kind.as_str().to_string());
    template.recurrence_day = day;
    template.recurrence_month = month;
}

/// Reject edits that would leave a template marked complete.
pub fn ensure_template_pending(task: &Task) -> Result<(), CoreError> {
    if task.is_recurring && !task.is_pending() {
        return Err(CoreError::Validation(
            "A recurring task cannot be marked complete".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Instance edits flow back to the template. `due_date` stays per-instance.
pub fn sync_template_from_instance(template: &mut Task, instance: &Task) {
    copy_shared_fields(template, instance);
}

/// Template edits flow to its pending instance. `due_date` stays
/// per-instance.
pub fn sync_instance_from_template(instance: &mut Task, template: &Task) {
    copy_shared_fields(instance, template);
}

fn copy_shared_fields(to: &mut Task, from: &Task) {
    to.folder_id = from.folder_id;
    to.title.clone_from(&from.title);
    to.priority = from.priority;
    to.due_time = from.due_time;
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// The instance created when a task first becomes recurring. It keeps the
/// template's due date and time.
pub fn first_instance(template: &Task) -> NewInstance {
    NewInstance {
        user_id: template.user_id,
        folder_id: template.folder_id,
        title: template.title.clone(),
        priority: template.priority,
        due_date: template.due_date,
        due_time: template.due_time,
        parent_task_id: template.id,
    }
}

/// The instance spawned when the active one is completed. It is due
/// `today`, at the template's due time.
pub fn next_instance(template: &Task, today: NaiveDate) -> NewInstance {
    NewInstance {
        due_date: Some(today),
        ..first_instance(template)
    }
}

/// Whether a template may spawn another instance at all.
pub fn accepts_instances(template: &Task) -> bool {
    template.is_recurring && !template.archived
}

/// An instance that counts toward its template's one pending slot.
///
/// Archived instances are hidden and never supersede a live sibling.
pub fn is_active_instance(task: &Task) -> bool {
    matches!(task.role(), TaskRole::Instance { .. }) && !task.archived
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
