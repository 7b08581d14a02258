/// Task, folder and user ids (PostgreSQL `BIGSERIAL`).
pub type DbId = i64;

/// `created_at` / `updated_at` stamps, stored as `TIMESTAMPTZ` in UTC.
/// Due dates and completion dates are calendar dates (`NaiveDate`) instead.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
