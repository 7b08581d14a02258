//! Plain-text message composition for reminders and digests.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use taskboard_db::models::task::TaskSummary;

/// Subject of the past-due digest.
pub const DIGEST_SUBJECT: &str = "Past Due Tasks";

/// Why a reminder is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    DueToday,
    DueSoon,
    Overdue,
}

impl ReminderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderKind::DueToday => "due_today",
            ReminderKind::DueSoon => "due_soon",
            ReminderKind::Overdue => "overdue",
        }
    }
}

/// A subject and body ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub subject: String,
    pub body: String,
}

/// `March 5, 2024`
fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `9:05 AM`
fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Compose a reminder for a single task.
pub fn reminder_email(task: &TaskSummary, kind: ReminderKind, site_name: &str) -> ComposedEmail {
    let title = &task.title;
    let (subject, lead) = match kind {
        ReminderKind::DueToday => (
            format!("Task Due Today: {title}"),
            format!("Your task \"{title}\" is due today."),
        ),
        ReminderKind::DueSoon => {
            let at = task.due_time.map(format_time).unwrap_or_default();
            (
                format!("Task Due Soon: {title}"),
                format!("Your task \"{title}\" is due soon at {at}."),
            )
        }
        ReminderKind::Overdue => (
            format!("Overdue Task: {title}"),
            format!("Your task \"{title}\" is overdue."),
        ),
    };

    let mut lines = vec![lead, String::new()];
    if let Some(date) = task.due_date {
        lines.push(format!("Due date: {}", format_date(date)));
    }
    if let Some(time) = task.due_time {
        lines.push(format!("Due time: {}", format_time(time)));
    }
    if let Some(folder) = &task.folder_name {
        lines.push(format!("Folder: {folder}"));
    }
    lines.push(String::new());
    lines.push(format!("-- {site_name}"));

    ComposedEmail {
        subject,
        body: lines.join("\n"),
    }
}

/// Compose one digest listing every past-due task.
pub fn past_due_digest(tasks: &[TaskSummary], site_name: &str) -> ComposedEmail {
    let mut lines = vec![
        "You have the following past due tasks:".to_string(),
        String::new(),
    ];
    for task in tasks {
        let mut line = format!("- {}", task.title);
        if let Some(date) = task.due_date {
            line.push_str(&format!(" (due {})", format_date(date)));
        }
        if let Some(folder) = &task.folder_name {
            line.push_str(&format!(" [{folder}]"));
        }
        lines.push(line);
    }
    lines.push(String::new());
    lines.push(format!("-- {site_name}"));

    ComposedEmail {
        subject: DIGEST_SUBJECT.to_string(),
        body: lines.join("\n"),
    }
}
