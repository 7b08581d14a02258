//! Recurrence types and the due-date derivation rule.
//!
//! A recurring template stores an abstract rule (`recurrence_type`,
//! `recurrence_day`, `recurrence_month`). The abstract fields are always
//! derived from a concrete due date at the moment recurrence is configured
//! or edited; see [`derive_fields`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Recurrence type
// ---------------------------------------------------------------------------

/// Wire/database value for daily recurrence.
pub const RECURRENCE_DAILY: &str = "daily";
/// Wire/database value for weekly recurrence.
pub const RECURRENCE_WEEKLY: &str = "weekly";
/// Wire/database value for monthly recurrence.
pub const RECURRENCE_MONTHLY: &str = "monthly";
/// Wire/database value for yearly recurrence.
pub const RECURRENCE_YEARLY: &str = "yearly";

/// Form value that explicitly turns recurrence off.
pub const RECURRENCE_NONE: &str = "none";

/// All valid recurrence values, in display order.
pub const VALID_RECURRENCES: &[&str] = &[
    RECURRENCE_DAILY,
    RECURRENCE_WEEKLY,
    RECURRENCE_MONTHLY,
    RECURRENCE_YEARLY,
];

/// How often a template produces a new instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceType {
    /// The lowercase value stored in `tasks.recurrence_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            RecurrenceType::Daily => RECURRENCE_DAILY,
            RecurrenceType::Weekly => RECURRENCE_WEEKLY,
            RecurrenceType::Monthly => RECURRENCE_MONTHLY,
            RecurrenceType::Yearly => RECURRENCE_YEARLY,
        }
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            RECURRENCE_DAILY => Ok(RecurrenceType::Daily),
            RECURRENCE_WEEKLY => Ok(RecurrenceType::Weekly),
            RECURRENCE_MONTHLY => Ok(RecurrenceType::Monthly),
            RECURRENCE_YEARLY => Ok(RecurrenceType::Yearly),
            other => Err(CoreError::Validation(format!(
                "Invalid recurrence '{other}'. Must be one of: {VALID_RECURRENCES:?}"
            ))),
        }
    }
}

/// Parse the `recurrence` form field.
///
/// Absent, blank, and `"none"` all mean "recurrence off" and yield `None`.
pub fn parse_recurrence(raw: Option<&str>) -> Result<Option<RecurrenceType>, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case(RECURRENCE_NONE) => Ok(None),
        Some(v) => v.to_ascii_lowercase().parse().map(Some),
    }
}

// ---------------------------------------------------------------------------
// Derivation rule
// ---------------------------------------------------------------------------

/// The day/month part of a recurrence rule.
///
/// `day` is a day-of-month (1-31) for monthly/yearly rules and a weekday
/// index (0 = Monday .. 6 = Sunday) for weekly rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecurrenceFields {
    pub day: Option<i16>,
    pub month: Option<i16>,
}

/// Derive the abstract recurrence fields from a concrete due date.
///
/// | type    | day                  | month     |
/// |---------|----------------------|-----------|
/// | daily   | cleared              | untouched |
/// | weekly  | weekday (0=Mon)      | untouched |
/// | monthly | day-of-month         | untouched |
/// | yearly  | day-of-month         | month     |
///
/// Without a due date nothing is recomputed and `current` is returned as-is.
pub fn derive_fields(
    kind: RecurrenceType,
    due_date: Option<NaiveDate>,
    current: RecurrenceFields,
) -> RecurrenceFields {
    let Some(due) = due_date else {
        return current;
    };

    let day_of_month = due.day() as i16;
    match kind {
        RecurrenceType::Daily => RecurrenceFields {
            day: None,
            month: current.month,
        },
        RecurrenceType::Weekly => RecurrenceFields {
            day: Some(due.weekday().num_days_from_monday() as i16),
            month: current.month,
        },
        RecurrenceType::Monthly => RecurrenceFields {
            day: Some(day_of_month),
            month: current.month,
        },
        RecurrenceType::Yearly => RecurrenceFields {
            day: Some(day_of_month),
            month: Some(due.month() as i16),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
