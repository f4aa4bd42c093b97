use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use taskpush_core::{DayOfWeek, ReminderPayload};
use taskpush_tasks::Task;

use crate::types::SweepSettings;

/// Tomorrow's calendar date and its weekday in the stored-task encoding.
///
/// "Tomorrow" is taken in `now`'s own timezone, so callers pick the zone by
/// choosing the offset of `now`. Month, year and leap-day roll-over come from
/// chrono's calendar arithmetic.
pub fn target_day<Tz: TimeZone>(now: &DateTime<Tz>) -> (NaiveDate, DayOfWeek) {
    let tomorrow = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX);
    (tomorrow, DayOfWeek::from(tomorrow.weekday()))
}

/// Exactly the tasks scheduled on `target`, in input order.
pub fn due_tomorrow(tasks: &[Task], target: DayOfWeek) -> Vec<&Task> {
    tasks.iter().filter(|task| task.day == target).collect()
}

pub fn build_payload(task: &Task, settings: &SweepSettings) -> ReminderPayload {
    ReminderPayload::due_tomorrow(&settings.title, &task.name, &task.time, &settings.vibrate)
}
