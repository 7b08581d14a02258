//! Results reported by the engine operations.

use serde::Serialize;
use taskboard_core::types::DbId;
use taskboard_db::models::task::Task;

/// What an edit did, by the role the edited task had.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    /// An instance was edited and its changes were carried to the template.
    InstanceUpdated {
        instance: Task,
        template: Task,
        /// Sibling instances archived because this one was reopened.
        superseded_instance_ids: Vec<DbId>,
    },
    /// Recurrence was cleared on an instance: it is standalone now and the
    /// template is gone.
    InstanceDetached {
        task: Task,
        deleted_template_id: DbId,
    },
    /// A task became a template. `spawned` is false when a pending instance
    /// left over from an earlier recurring period was synced instead.
    RecurrenceEnabled {
        template: Task,
        instance: Task,
        spawned: bool,
    },
    /// A template stayed a template; its pending instance, if any, was synced.
    TemplateUpdated {
        template: Task,
        synced_instance: Option<Task>,
    },
    /// A non-recurring edit, including turning recurrence off on a template.
    Updated { task: Task },
}

impl EditOutcome {
    /// The row the caller edited, as saved.
    pub fn task(&self) -> &Task {
        match self {
            EditOutcome::InstanceUpdated { instance, .. } => instance,
            EditOutcome::InstanceDetached { task, .. } => task,
            EditOutcome::RecurrenceEnabled { template, .. } => template,
            EditOutcome::TemplateUpdated { template, .. } => template,
            EditOutcome::Updated { task } => task,
        }
    }
}

/// Result of toggling a task's completion.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub task: Task,
    /// The next instance, when completing an instance spawned one.
    pub spawned: Option<Task>,
    /// Sibling instances archived because this one was reopened.
    pub superseded_instance_ids: Vec<DbId>,
}

/// Result of setting every task in a scope to one status.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkCompletionOutcome {
    /// Tasks whose status changed.
    pub affected: u64,
    /// Instances spawned by completions.
    pub spawned_ids: Vec<DbId>,
    /// Instances archived by reopenings.
    pub superseded_instance_ids: Vec<DbId>,
}
