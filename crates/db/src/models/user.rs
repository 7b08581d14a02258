//! User entity model.
//!
//! Users are provisioned outside this application; only the fields needed
//! for ownership and reminder delivery are modelled.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskboard_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub notification_email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Address reminders go to: the notification email if set, otherwise
    /// the account email. `None` when neither is usable.
    pub fn reminder_recipient(&self) -> Option<&str> {
        self.notification_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .or_else(|| Some(self.email.trim()).filter(|e| !e.is_empty()))
    }
}

/// DTO for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub notification_email: Option<String>,
}
