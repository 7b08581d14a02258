//! Task entity model and DTOs.
//!
//! One table holds standalone tasks, recurrence templates, and the
//! instances generated from templates; [`Task::role`] tells them apart.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskboard_core::recurrence::{RecurrenceFields, RecurrenceType};
use taskboard_core::task::{TaskRole, TaskStatus};
use taskboard_core::types::{DbId, Timestamp};

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub user_id: DbId,
    pub folder_id: Option<DbId>,
    pub title: String,
    pub priority: i16,
    pub status_id: i16,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub completed_date: Option<NaiveDate>,
    pub archived: bool,
    pub is_recurring: bool,
    pub recurrence_type: Option<String>,
    pub recurrence_day: Option<i16>,
    pub recurrence_month: Option<i16>,
    pub last_generated: Option<NaiveDate>,
    pub parent_task_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Standalone, template, or instance.
    pub fn role(&self) -> TaskRole {
        TaskRole::classify(self.is_recurring, self.parent_task_id)
    }

    /// Current status. The column is constrained to known values.
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_id(self.status_id).unwrap_or(TaskStatus::Pending)
    }

    pub fn is_pending(&self) -> bool {
        self.status() == TaskStatus::Pending
    }

    /// Parsed `recurrence_type`, if any.
    pub fn recurrence(&self) -> Option<RecurrenceType> {
        self.recurrence_type.as_deref().and_then(|s| s.parse().ok())
    }

    /// The stored day/month part of the recurrence rule.
    pub fn recurrence_fields(&self) -> RecurrenceFields {
        RecurrenceFields {
            day: self.recurrence_day,
            month: self.recurrence_month,
        }
    }
}

/// DTO for quick-adding a task (title and optional folder only).
#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub folder_id: Option<DbId>,
}

/// Insert payload for a generated instance.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInstance {
    pub user_id: DbId,
    pub folder_id: Option<DbId>,
    pub title: String,
    pub priority: i16,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub parent_task_id: DbId,
}

/// DTO for updating only the priority of a task.
#[derive(Debug, Deserialize)]
pub struct UpdatePriority {
    pub priority: i16,
}

/// Which of a user's tasks a list or bulk operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Every task of the user.
    All,
    /// Tasks in one folder.
    Folder(DbId),
    /// Tasks that are not in any folder.
    Unfiled,
}

/// Query parameters for listing tasks and for scoped bulk operations.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub folder_id: Option<DbId>,
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub include_archived: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TaskListParams {
    /// `all` wins over `folder_id`; with neither, unfiled tasks are listed.
    pub fn scope(&self) -> TaskScope {
        match (self.all, self.folder_id) {
            (true, _) => TaskScope::All,
            (false, Some(id)) => TaskScope::Folder(id),
            (false, None) => TaskScope::Unfiled,
        }
    }
}

/// A task joined with its folder name, as used in reminder emails.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskSummary {
    pub id: DbId,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub folder_name: Option<String>,
}
