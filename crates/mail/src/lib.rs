//! Taskboard mail collaborator.
//!
//! - [`compose`] builds the plain-text reminder and digest messages.
//! - [`delivery`] sends them over SMTP.
//! - [`Mailer`] ties both together behind the two operations the HTTP layer
//!   calls, reporting a [`DeliveryOutcome`] instead of raising.

pub mod compose;
pub mod delivery;
pub mod mailer;

pub use compose::ReminderKind;
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use mailer::{DeliveryOutcome, Mailer};
