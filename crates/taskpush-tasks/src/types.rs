use serde::{Deserialize, Serialize};
use taskpush_core::DayOfWeek;

/// A persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// UUID v4 string: primary key.
    pub id: String,
    /// Weekday the task happens on (0 = Monday … 6 = Sunday).
    pub day: DayOfWeek,
    /// Human-readable label.
    pub name: String,
    /// Free-form time of day, shown verbatim in reminders.
    pub time: String,
    /// ISO-8601 timestamp of task creation.
    pub created_at: String,
}
