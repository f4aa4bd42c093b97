use chrono::NaiveDate;
use dashmap::DashMap;

/// Remembers, per task, the last target date a reminder went out for.
///
/// Without it a once-a-minute sweep would remind about the same task all day.
/// In-memory only: a restart may send one repeat reminder.
#[derive(Debug, Default)]
pub struct NotifiedLedger {
    /// task_id -> target date of the last delivered reminder
    entries: DashMap<String, NaiveDate>,
}

impl NotifiedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_notified(&self, task_id: &str, target_date: NaiveDate) -> bool {
        self.entries
            .get(task_id)
            .is_some_and(|date| *date == target_date)
    }

    pub fn mark(&self, task_id: &str, target_date: NaiveDate) {
        self.entries.insert(task_id.to_string(), target_date);
    }

    /// Drop entries for dates before `date`; deleted tasks age out this way too.
    pub fn prune_before(&self, date: NaiveDate) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, notified| *notified >= date);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
