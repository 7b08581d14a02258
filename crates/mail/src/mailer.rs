//! The reminder and digest operations used by the HTTP layer.
//!
//! Failures never propagate: every path ends in a [`DeliveryOutcome`], and
//! errors are logged here.

use serde::Serialize;
use taskboard_db::models::task::TaskSummary;
use taskboard_db::models::user::User;

use crate::compose::{self, ComposedEmail, ReminderKind};
use crate::delivery::email::{EmailConfig, EmailDelivery};

/// Site name used in signatures when `SITE_NAME` is not set.
pub const DEFAULT_SITE_NAME: &str = "Taskboard";

const NO_RECIPIENT: &str = "User has no email address";
const NOT_CONFIGURED: &str = "Email delivery is not configured";

/// Result of a send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn sent() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Composes and sends task mail for users.
pub struct Mailer {
    delivery: Option<EmailDelivery>,
    site_name: String,
}

impl Mailer {
    /// `delivery = None` means SMTP is not configured; sends then fail softly.
    pub fn new(delivery: Option<EmailDelivery>, site_name: impl Into<String>) -> Self {
        Self {
            delivery,
            site_name: site_name.into(),
        }
    }

    /// Build from `SMTP_*` and `SITE_NAME` environment variables.
    pub fn from_env() -> Self {
        let delivery = EmailConfig::from_env().map(EmailDelivery::new);
        if delivery.is_none() {
            tracing::warn!("SMTP_HOST not set, email delivery disabled");
        }
        let site_name =
            std::env::var("SITE_NAME").unwrap_or_else(|_| DEFAULT_SITE_NAME.to_string());
        Self::new(delivery, site_name)
    }

    pub fn is_configured(&self) -> bool {
        self.delivery.is_some()
    }

    /// Send a reminder about one task.
    pub async fn send_task_reminder_email(
        &self,
        user: &User,
        task: &TaskSummary,
        kind: ReminderKind,
    ) -> DeliveryOutcome {
        let email = compose::reminder_email(task, kind, &self.site_name);
        let outcome = self.send_to(user, &email).await;
        if outcome.success {
            tracing::info!(
                user_id = user.id,
                task_id = task.id,
                kind = kind.as_str(),
                "Reminder sent",
            );
        }
        outcome
    }

    /// Send one digest listing all of the user's past-due tasks.
    pub async fn send_past_due_digest_email(
        &self,
        user: &User,
        tasks: &[TaskSummary],
    ) -> DeliveryOutcome {
        let email = compose::past_due_digest(tasks, &self.site_name);
        let outcome = self.send_to(user, &email).await;
        if outcome.success {
            tracing::info!(user_id = user.id, tasks = tasks.len(), "Past due digest sent");
        }
        outcome
    }

    async fn send_to(&self, user: &User, email: &ComposedEmail) -> DeliveryOutcome {
        let Some(recipient) = user.reminder_recipient() else {
            tracing::warn!(user_id = user.id, subject = %email.subject, "{}", NO_RECIPIENT);
            return DeliveryOutcome::failed(NO_RECIPIENT);
        };
        let Some(delivery) = &self.delivery else {
            tracing::warn!(user_id = user.id, subject = %email.subject, "{}", NOT_CONFIGURED);
            return DeliveryOutcome::failed(NOT_CONFIGURED);
        };

        match delivery.deliver(recipient, email).await {
            Ok(()) => DeliveryOutcome::sent(),
            Err(e) => {
                tracing::error!(
                    user_id = user.id,
                    subject = %email.subject,
                    error = %e,
                    "Failed to send email",
                );
                DeliveryOutcome::failed(e.to_string())
            }
        }
    }
}
