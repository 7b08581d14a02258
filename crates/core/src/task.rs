//! Task status, role, and form validation rules.
//!
//! A task row is one of three things (see [`TaskRole`]): a standalone task,
//! a recurrence template, or an instance generated from a template. The
//! validated edit payload shared by every edit entry point is [`TaskEdit`].

use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::recurrence::{parse_recurrence, RecurrenceType};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest (least urgent) priority.
pub const MIN_PRIORITY: i16 = 1;
/// Highest (most urgent) priority.
pub const MAX_PRIORITY: i16 = 10;
/// Priority given to quick-added tasks.
pub const DEFAULT_PRIORITY: i16 = 5;

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Completion status. Discriminants match `tasks.status_id`.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending = 0,
    Complete = 1,
}

impl TaskStatus {
    /// Return the database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    /// Map a database status ID back to a status.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(TaskStatus::Pending),
            1 => Some(TaskStatus::Complete),
            _ => None,
        }
    }

    /// The opposite status.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Complete,
            TaskStatus::Complete => TaskStatus::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What a task row represents in the recurrence model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskRole {
    /// An ordinary, one-off task.
    Standalone,
    /// Holds the recurrence rule; never worked on directly.
    Template,
    /// A concrete occurrence generated from `template_id`.
    Instance { template_id: DbId },
}

impl TaskRole {
    /// Classify a row from its `is_recurring` flag and `parent_task_id`.
    ///
    /// A parent reference always wins: instances are instances regardless of
    /// their own `is_recurring` flag.
    pub fn classify(is_recurring: bool, parent_task_id: Option<DbId>) -> Self {
        match (parent_task_id, is_recurring) {
            (Some(template_id), _) => TaskRole::Instance { template_id },
            (None, true) => TaskRole::Template,
            (None, false) => TaskRole::Standalone,
        }
    }
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

/// Trim a title and capitalize its first letter. Empty titles are rejected.
pub fn normalize_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return Err(CoreError::Validation("Title must not be empty".into()));
    };
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(first.to_uppercase().chain(chars).collect())
}

/// Validate that a priority lies within `MIN_PRIORITY..=MAX_PRIORITY`.
pub fn validate_priority(priority: i16) -> Result<(), CoreError> {
    if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Priority must be between {MIN_PRIORITY} and {MAX_PRIORITY} (got {priority})"
        )))
    }
}

// ---------------------------------------------------------------------------
// Edit form
// ---------------------------------------------------------------------------

fn default_priority() -> i16 {
    DEFAULT_PRIORITY
}

/// Parse an optional text field, treating blank input as absent.
///
/// HTML forms submit empty strings for unset date, time, and select inputs.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Folder IDs arrive as JSON numbers or as form strings.
fn folder_id<'de, D>(deserializer: D) -> Result<Option<DbId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Id(DbId),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Id(id)) => Ok(Some(id)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

/// Raw edit form as submitted by either edit entry point.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskForm {
    #[serde(default, deserialize_with = "folder_id")]
    pub folder: Option<DbId>,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[serde(default = "default_priority")]
    #[validate(range(min = 1, max = 10))]
    pub priority: i16,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub due_time: Option<NaiveTime>,
    #[serde(default)]
    pub recurrence: Option<String>,
    /// `0` = pending, `1` = complete. Absent leaves the status unchanged.
    #[serde(default)]
    #[validate(range(min = 0, max = 1))]
    pub status: Option<i16>,
}

/// A validated edit, ready for the recurrence engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEdit {
    pub folder_id: Option<DbId>,
    pub title: String,
    pub priority: i16,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub status: Option<TaskStatus>,
    /// `None` turns recurrence off.
    pub recurrence: Option<RecurrenceType>,
}

impl TaskForm {
    /// Validate the raw form and convert it into a [`TaskEdit`].
    pub fn validated(self) -> Result<TaskEdit, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        validate_priority(self.priority)?;

        let status = match self.status {
            Some(id) => Some(TaskStatus::from_id(id).ok_or_else(|| {
                CoreError::Validation(format!("Invalid task status {id}"))
            })?),
            None => None,
        };

        Ok(TaskEdit {
            folder_id: self.folder,
            title: normalize_title(&self.title)?,
            priority: self.priority,
            due_date: self.due_date,
            due_time: self.due_time,
            status,
            recurrence: parse_recurrence(self.recurrence.as_deref())?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str) -> TaskForm {
        TaskForm {
            folder: None,
            title: title.to_string(),
            priority: 5,
            due_date: None,
            due_time: None,
            recurrence: None,
            status: None,
        }
    }

    // -- status --------------------------------------------------------------

    #[test]
    fn status_ids_match_storage() {
        assert_eq!(TaskStatus::Pending.id(), 0);
        assert_eq!(TaskStatus::Complete.id(), 1);
        assert_eq!(TaskStatus::from_id(1), Some(TaskStatus::Complete));
        assert_eq!(TaskStatus::from_id(7), None);
    }

    #[test]
    fn toggling_twice_is_identity() {
        for s in [TaskStatus::Pending, TaskStatus::Complete] {
            assert_eq!(s.toggled().toggled(), s);
            assert_ne!(s.toggled(), s);
        }
    }

    // -- role ----------------------------------------------------------------

    #[test]
    fn classify_covers_all_roles() {
        assert_eq!(TaskRole::classify(false, None), TaskRole::Standalone);
        assert_eq!(TaskRole::classify(true, None), TaskRole::Template);
        assert_eq!(
            TaskRole::classify(false, Some(9)),
            TaskRole::Instance { template_id: 9 }
        );
    }

    #[test]
    fn parent_reference_wins_over_recurring_flag() {
        assert_eq!(
            TaskRole::classify(true, Some(3)),
            TaskRole::Instance { template_id: 3 }
        );
    }

    // -- title / priority ----------------------------------------------------

    #[test]
    fn title_is_trimmed_and_capitalized() {
        assert_eq!(normalize_title("  water plants ").unwrap(), "Water plants");
        assert_eq!(normalize_title("éclair").unwrap(), "Éclair");
        assert_eq!(normalize_title("Already").unwrap(), "Already");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(normalize_title("").is_err());
        assert!(normalize_title("   ").is_err());
    }

    #[test]
    fn overlong_title_is_rejected() {
        let long = "a".repeat(MAX_TITLE_LENGTH + 1);
        assert!(normalize_title(&long).is_err());
    }

    #[test]
    fn priority_bounds() {
        assert!(validate_priority(1).is_ok());
        assert!(validate_priority(10).is_ok());
        assert!(validate_priority(0).is_err());
        assert!(validate_priority(11).is_err());
    }

    // -- form ----------------------------------------------------------------

    #[test]
    fn valid_form_converts_to_edit() {
        let mut f = form("pay rent");
        f.recurrence = Some("monthly".into());
        f.status = Some(1);
        let edit = f.validated().unwrap();
        assert_eq!(edit.title, "Pay rent");
        assert_eq!(edit.recurrence, Some(RecurrenceType::Monthly));
        assert_eq!(edit.status, Some(TaskStatus::Complete));
    }

    #[test]
    fn form_with_out_of_range_priority_is_rejected() {
        let mut f = form("x");
        f.priority = 12;
        assert!(matches!(f.validated(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn form_with_bad_recurrence_is_rejected() {
        let mut f = form("x");
        f.recurrence = Some("hourly".into());
        assert!(matches!(f.validated(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn form_with_bad_status_is_rejected() {
        let mut f = form("x");
        f.status = Some(4);
        assert!(f.validated().is_err());
    }

    #[test]
    fn form_deserializes_with_defaults() {
        let f: TaskForm = serde_json::from_str(
            r#"{"title": "gym", "due_date": "2024-03-15", "due_time": "07:30:00", "recurrence": ""}"#,
        )
        .unwrap();
        assert_eq!(f.priority, DEFAULT_PRIORITY);
        let edit = f.validated().unwrap();
        assert_eq!(edit.recurrence, None);
        assert_eq!(edit.due_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn blank_form_fields_are_absent() {
        let f: TaskForm = serde_json::from_str(
            r#"{"title": "gym", "folder": "", "due_date": "", "due_time": " "}"#,
        )
        .unwrap();
        assert_eq!(f.folder, None);
        assert_eq!(f.due_date, None);
        assert_eq!(f.due_time, None);
    }

    #[test]
    fn folder_accepts_number_or_text() {
        let f: TaskForm = serde_json::from_str(r#"{"title": "a", "folder": 4}"#).unwrap();
        assert_eq!(f.folder, Some(4));
        let f: TaskForm = serde_json::from_str(r#"{"title": "a", "folder": "9"}"#).unwrap();
        assert_eq!(f.folder, Some(9));
    }
}
