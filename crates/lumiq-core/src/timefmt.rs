//! Timestamp rendering for notification emails.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Renders an instant in the business timezone for the notification email,
/// e.g. "Monday, January 5, 2026 at 3:07 PM".
pub fn human_timestamp(at: DateTime<Utc>, zone: Tz) -> String {
    at.with_timezone(&zone)
        .format("%A, %B %-d, %Y at %-I:%M %p")
        .to_string()
}
