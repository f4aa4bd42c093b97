pub mod config;
pub mod error;
pub mod reminder;
pub mod types;

pub use error::{Result, TaskpushError};
pub use reminder::ReminderPayload;
pub use types::DayOfWeek;
