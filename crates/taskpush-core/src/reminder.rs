//! Reminder payload types: shared between the sweep and the push dispatcher.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "⏰ Upcoming Task Reminder";
pub const DEFAULT_VIBRATE: [u64; 3] = [200, 100, 200];

/// JSON body handed to the service worker: `{title, body, vibrate}`.
///
/// Built fresh for every matching task on every tick and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub title: String,
    pub body: String,
    pub vibrate: Vec<u64>,
}

impl ReminderPayload {
    /// Reminder for a task happening tomorrow at `time`.
    pub fn due_tomorrow(title: &str, name: &str, time: &str, vibrate: &[u64]) -> Self {
        Self {
            title: title.to_string(),
            body: format!("{name} is scheduled for tomorrow at {time}"),
            vibrate: vibrate.to_vec(),
        }
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
