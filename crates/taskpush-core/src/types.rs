use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TaskpushError;

/// Weekday encoding shared by task creation and the reminder sweep.
///
/// `0 = Monday … 6 = Sunday`, i.e. chrono's `num_days_from_monday`. Both the
/// write path (`POST /task`) and the sweep's target computation go through
/// this type, so the two can never disagree on what a stored `day` means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const MONDAY: DayOfWeek = DayOfWeek(0);
    pub const SUNDAY: DayOfWeek = DayOfWeek(6);

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn to_weekday(self) -> Weekday {
        match self.0 {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        // num_days_from_monday is always 0..=6
        Self(weekday.num_days_from_monday() as u8)
    }
}

impl TryFrom<i64> for DayOfWeek {
    type Error = TaskpushError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=6).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(TaskpushError::InvalidDay(value))
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = TaskpushError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.to_weekday())
    }
}
