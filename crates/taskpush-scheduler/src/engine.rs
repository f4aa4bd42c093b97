use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Utc};
use futures_util::{stream, StreamExt};
use taskpush_core::ReminderPayload;
use taskpush_push::{DispatchError, Dispatcher, Subscription, SubscriptionRegistry};
use taskpush_tasks::TaskStore;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::{
    error::Result,
    ledger::NotifiedLedger,
    schedule::{build_payload, due_tomorrow, target_day},
    types::{SweepSettings, TickReport},
};

/// The reminder sweep: reads tasks, finds tomorrow's, pushes reminders.
///
/// Collaborators are injected behind traits so tests can swap any of them.
pub struct ReminderSweep {
    tasks: Arc<dyn TaskStore>,
    subscriptions: Arc<dyn SubscriptionRegistry>,
    dispatcher: Arc<dyn Dispatcher>,
    settings: SweepSettings,
    ledger: NotifiedLedger,
}

impl ReminderSweep {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        subscriptions: Arc<dyn SubscriptionRegistry>,
        dispatcher: Arc<dyn Dispatcher>,
        settings: SweepSettings,
    ) -> Self {
        Self {
            tasks,
            subscriptions,
            dispatcher,
            settings,
            ledger: NotifiedLedger::new(),
        }
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &NotifiedLedger {
        &self.ledger
    }

    /// Current time in the configured offset (host local time when unset).
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self.settings.utc_offset {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => Local::now().fixed_offset(),
        }
    }

    /// Run one tick against the current clock.
    pub async fn tick(&self) -> Result<TickReport> {
        self.tick_at(self.now()).await
    }

    /// Run one tick as if the time were `now`.
    ///
    /// Only a task-store read failure makes this return `Err`; delivery
    /// failures are logged, counted in the report and otherwise swallowed.
    pub async fn tick_at(&self, now: DateTime<FixedOffset>) -> Result<TickReport> {
        let tasks = self.tasks.list_tasks()?;

        let (target_date, target) = target_day(&now);
        let mut report = TickReport::new(target_date, target);

        let matching = due_tomorrow(&tasks, target);
        report.matched = matching.len();

        if self.settings.dedupe {
            let pruned = self.ledger.prune_before(target_date);
            if pruned > 0 {
                debug!(pruned, "ledger entries expired");
            }
        }
        let pending: Vec<_> = matching
            .into_iter()
            .filter(|task| !(self.settings.dedupe && self.ledger.is_notified(&task.id, target_date)))
            .collect();
        report.skipped_notified = report.matched - pending.len();

        if pending.is_empty() {
            return Ok(report);
        }

        let subscriptions = self.subscriptions.list_all();
        if subscriptions.is_empty() {
            debug!(due = pending.len(), "tasks due tomorrow but no subscriptions registered");
            return Ok(report);
        }

        if !self.dispatcher.is_configured() {
            report.unconfigured = pending.len() * subscriptions.len();
            return Ok(report);
        }

        // One attempt per (task, subscription); payloads are shared per task.
        let mut attempts = Vec::with_capacity(pending.len() * subscriptions.len());
        for task in &pending {
            let payload = Arc::new(build_payload(task, &self.settings));
            for sub in &subscriptions {
                attempts.push((task.id.clone(), Arc::clone(&payload), Arc::clone(sub)));
            }
        }

        let outcomes: Vec<_> = stream::iter(attempts)
            .map(|(task_id, payload, sub)| async move {
                let result = self.deliver_one(&sub, &payload).await;
                (task_id, sub, result)
            })
            .buffer_unordered(self.settings.max_concurrent_deliveries.max(1))
            .collect()
            .await;

        let mut reminded: HashSet<String> = HashSet::new();
        for (task_id, sub, result) in outcomes {
            report.attempted += 1;
            match result {
                Ok(()) => {
                    report.delivered += 1;
                    reminded.insert(task_id);
                }
                Err(DispatchError::Gone { status }) => {
                    report.failed += 1;
                    warn!(task_id = %task_id, endpoint = %sub.endpoint, status, "push subscription is gone");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(task_id = %task_id, endpoint = %sub.endpoint, error = %e, "push failed");
                }
            }
        }

        if self.settings.dedupe {
            for task_id in &reminded {
                self.ledger.mark(task_id, target_date);
            }
        }

        Ok(report)
    }

    async fn deliver_one(
        &self,
        sub: &Subscription,
        payload: &ReminderPayload,
    ) -> std::result::Result<(), DispatchError> {
        let timeout = self.settings.delivery_timeout;
        match tokio::time::timeout(timeout, self.dispatcher.deliver(sub, payload)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout {
                ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Main loop. Ticks every `settings.interval` until `shutdown` broadcasts `true`.
    ///
    /// Ticks never overlap: each is awaited before the next is scheduled, and
    /// ticks missed while one ran long are skipped. Each tick runs in its own
    /// task so a panic inside a dispatcher is logged instead of ending the loop.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.settings.interval.as_secs(),
            dispatcher = self.dispatcher.name(),
            dedupe = self.settings.dedupe,
            "reminder sweep started"
        );

        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let sweep = Arc::clone(&self);
                    match tokio::spawn(async move { sweep.tick().await }).await {
                        Ok(Ok(report)) => log_report(&report),
                        Ok(Err(e)) => error!("reminder sweep tick failed: {e}"),
                        Err(e) => error!("reminder sweep tick panicked: {e}"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("reminder sweep shutting down");
                        break;
                    }
                }
            }
        }
    }
}

fn log_report(report: &TickReport) {
    if report.unconfigured > 0 {
        warn!(
            target_date = %report.target_date,
            matched = report.matched,
            dropped = report.unconfigured,
            "push delivery is not configured; reminders not sent"
        );
    } else if report.attempted > 0 {
        info!(
            target_date = %report.target_date,
            target_day = report.target_day.index(),
            matched = report.matched,
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            "reminder sweep tick"
        );
    } else {
        debug!(
            target_date = %report.target_date,
            matched = report.matched,
            skipped = report.skipped_notified,
            "reminder sweep tick: nothing to send"
        );
    }
}
