// End-to-end behaviour of one sweep tick and of the tick loop, with a real
// in-memory SQLite task store and scripted dispatchers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use taskpush_core::{DayOfWeek, ReminderPayload};
use taskpush_push::{
    DispatchError, Dispatcher, InMemorySubscriptionRegistry, NullDispatcher, Subscription, SubscriptionKeys,
    SubscriptionRegistry,
};
use taskpush_scheduler::{schedule::target_day, ReminderSweep, SweepError, SweepSettings};
use taskpush_tasks::{SqliteTaskStore, Task, TaskStore, TaskStoreError};

/// Records every attempt; fails or hangs for chosen endpoints.
#[derive(Default)]
struct ScriptedDispatcher {
    attempts: Mutex<Vec<(String, ReminderPayload)>>,
    failing: Vec<String>,
    hanging: Vec<String>,
}

impl ScriptedDispatcher {
    fn failing(endpoints: &[&str]) -> Self {
        Self {
            failing: endpoints.iter().map(|e| e.to_string()).collect(),
            ..Self::default()
        }
    }

    fn hanging(endpoints: &[&str]) -> Self {
        Self {
            hanging: endpoints.iter().map(|e| e.to_string()).collect(),
            ..Self::default()
        }
    }

    fn attempts(&self) -> Vec<(String, ReminderPayload)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for ScriptedDispatcher {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &ReminderPayload,
    ) -> Result<(), DispatchError> {
        self.attempts
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.clone()));
        if self.hanging.contains(&subscription.endpoint) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(&subscription.endpoint) {
            return Err(DispatchError::Rejected {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(())
    }
}

/// Task store whose reads can be switched off.
struct FlakyStore {
    inner: SqliteTaskStore,
    broken: Mutex<bool>,
}

impl TaskStore for FlakyStore {
    fn create_task(&self, day: DayOfWeek, name: &str, time: &str) -> taskpush_tasks::Result<Task> {
        self.inner.create_task(day, name, time)
    }

    fn list_tasks(&self) -> taskpush_tasks::Result<Vec<Task>> {
        if *self.broken.lock().unwrap() {
            return Err(TaskStoreError::Database(rusqlite::Error::InvalidQuery));
        }
        self.inner.list_tasks()
    }

    fn get_task(&self, id: &str) -> taskpush_tasks::Result<Option<Task>> {
        self.inner.get_task(id)
    }

    fn delete_task(&self, id: &str) -> taskpush_tasks::Result<()> {
        self.inner.delete_task(id)
    }
}

fn sub(endpoint: &str) -> Subscription {
    Subscription {
        endpoint: endpoint.to_string(),
        expiration_time: None,
        keys: SubscriptionKeys {
            p256dh: "p".to_string(),
            auth: "a".to_string(),
        },
    }
}

fn day(i: u8) -> DayOfWeek {
    DayOfWeek::try_from(i).unwrap()
}

/// Tuesday 2024-01-02 noon UTC: tomorrow is Wednesday, weekday 2.
fn tuesday_noon() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap().fixed_offset()
}

struct Harness {
    store: Arc<SqliteTaskStore>,
    registry: Arc<InMemorySubscriptionRegistry>,
    dispatcher: Arc<ScriptedDispatcher>,
    sweep: ReminderSweep,
}

fn harness(dispatcher: ScriptedDispatcher, settings: SweepSettings) -> Harness {
    let store = Arc::new(SqliteTaskStore::in_memory().unwrap());
    let registry = Arc::new(InMemorySubscriptionRegistry::new());
    let dispatcher = Arc::new(dispatcher);
    let sweep = ReminderSweep::new(
        store.clone(),
        registry.clone(),
        dispatcher.clone(),
        settings,
    );
    Harness {
        store,
        registry,
        dispatcher,
        sweep,
    }
}

#[tokio::test]
async fn gym_and_call_scenario() {
    let h = harness(ScriptedDispatcher::default(), SweepSettings::default());
    h.store.create_task(day(2), "Gym", "18:00").unwrap();
    h.store.create_task(day(3), "Call", "09:00").unwrap();
    h.registry.register(sub("https://push/S1"));
    h.registry.register(sub("https://push/S2"));

    let report = h.sweep.tick_at(tuesday_noon()).await.unwrap();
    assert_eq!(report.target_day, day(2));
    assert_eq!(report.matched, 1);
    assert_eq!(report.attempted, 2);
    assert_eq!(report.delivered, 2);

    let mut attempts = h.dispatcher.attempts();
    attempts.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].0, "https://push/S1");
    assert_eq!(attempts[1].0, "https://push/S2");
    for (_, payload) in &attempts {
        assert_eq!(payload.body, "Gym is scheduled for tomorrow at 18:00");
        assert_eq!(payload.title, "⏰ Upcoming Task Reminder");
        assert_eq!(payload.vibrate, vec![200, 100, 200]);
    }
}

#[tokio::test]
async fn failing_subscription_is_isolated() {
    let h = harness(
        ScriptedDispatcher::failing(&["https://push/S1"]),
        SweepSettings::default(),
    );
    h.store.create_task(day(2), "Gym", "18:00").unwrap();
    h.store.create_task(day(2), "Groceries", "12:00").unwrap();
    h.registry.register(sub("https://push/S1"));
    h.registry.register(sub("https://push/S2"));

    let report = h.sweep.tick_at(tuesday_noon()).await.unwrap();
    assert_eq!(report.matched, 2);
    assert_eq!(report.attempted, 4);
    assert_eq!(report.failed, 2);
    assert_eq!(report.delivered, 2);

    let s2_bodies: Vec<String> = h
        .dispatcher
        .attempts()
        .into_iter()
        .filter(|(endpoint, _)| endpoint == "https://push/S2")
        .map(|(_, p)| p.body)
        .collect();
    assert_eq!(s2_bodies.len(), 2);
    assert!(s2_bodies.iter().any(|b| b.starts_with("Gym")));
    assert!(s2_bodies.iter().any(|b| b.starts_with("Groceries")));
}

#[tokio::test]
async fn no_matching_tasks_means_no_attempts() {
    let h = harness(ScriptedDispatcher::default(), SweepSettings::default());
    h.store.create_task(day(5), "Party", "20:00").unwrap();
    h.registry.register(sub("https://push/S1"));

    let report = h.sweep.tick_at(tuesday_noon()).await.unwrap();
    assert_eq!(report.matched, 0);
    assert_eq!(report.attempted, 0);
    assert!(h.dispatcher.attempts().is_empty());
}

#[tokio::test]
async fn no_subscriptions_means_no_attempts() {
    let h = harness(ScriptedDispatcher::default(), SweepSettings::default());
    h.store.create_task(day(2), "Gym", "18:00").unwrap();
    h.store.create_task(day(2), "Swim", "07:00").unwrap();

    let report = h.sweep.tick_at(tuesday_noon()).await.unwrap();
    assert_eq!(report.matched, 2);
    assert_eq!(report.attempted, 0);
    assert!(h.dispatcher.attempts().is_empty());
    // nothing was delivered, so nothing is marked
    assert!(h.sweep.ledger().is_empty());
}

#[tokio::test]
async fn dedupe_sends_once_per_target_date() {
    let h = harness(ScriptedDispatcher::default(), SweepSettings::default());
    h.store.create_task(day(2), "Gym", "18:00").unwrap();
    h.registry.register(sub("https://push/S1"));

    let first = h.sweep.tick_at(tuesday_noon()).await.unwrap();
    let second = h
        .sweep
        .tick_at(tuesday_noon() + chrono::Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(first.delivered, 1);
    assert_eq!(second.skipped_notified, 1);
    assert_eq!(second.attempted, 0);

    // A week later the same task is due again.
    let next_week = h
        .sweep
        .tick_at(tuesday_noon() + chrono::Duration::days(7))
        .await
        .unwrap();
    assert_eq!(next_week.delivered, 1);
    assert_eq!(h.dispatcher.attempts().len(), 2);
}

#[tokio::test]
async fn without_dedupe_every_tick_resends() {
    let settings = SweepSettings {
        dedupe: false,
        ..SweepSettings::default()
    };
    let h = harness(ScriptedDispatcher::default(), settings);
    h.store.create_task(day(2), "Gym", "18:00").unwrap();
    h.registry.register(sub("https://push/S1"));

    for minute in 0..3 {
        h.sweep
            .tick_at(tuesday_noon() + chrono::Duration::minutes(minute))
            .await
            .unwrap();
    }
    assert_eq!(h.dispatcher.attempts().len(), 3);
}

#[tokio::test]
async fn task_with_only_failures_is_retried_next_tick() {
    let h = harness(
        ScriptedDispatcher::failing(&["https://push/S1"]),
        SweepSettings::default(),
    );
    h.store.create_task(day(2), "Gym", "18:00").unwrap();
    h.registry.register(sub("https://push/S1"));

    h.sweep.tick_at(tuesday_noon()).await.unwrap();
    let again = h.sweep.tick_at(tuesday_noon()).await.unwrap();
    assert_eq!(again.skipped_notified, 0);
    assert_eq!(again.attempted, 1);
}

#[tokio::test]
async fn hanging_delivery_times_out_without_blocking_others() {
    let settings = SweepSettings {
        delivery_timeout: Duration::from_millis(50),
        ..SweepSettings::default()
    };
    let h = harness(ScriptedDispatcher::hanging(&["https://push/slow"]), settings);
    h.store.create_task(day(2), "Gym", "18:00").unwrap();
    h.registry.register(sub("https://push/slow"));
    h.registry.register(sub("https://push/fast"));

    let report = h.sweep.tick_at(tuesday_noon()).await.unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn store_failure_aborts_only_that_tick() {
    let store = Arc::new(FlakyStore {
        inner: SqliteTaskStore::in_memory().unwrap(),
        broken: Mutex::new(true),
    });
    store.create_task(day(2), "Gym", "18:00").unwrap();
    let registry = Arc::new(InMemorySubscriptionRegistry::new());
    registry.register(sub("https://push/S1"));
    let dispatcher = Arc::new(ScriptedDispatcher::default());
    let sweep = ReminderSweep::new(
        store.clone(),
        registry,
        dispatcher.clone(),
        SweepSettings::default(),
    );

    let err = sweep.tick_at(tuesday_noon()).await.unwrap_err();
    assert!(matches!(err, SweepError::StoreRead(_)));
    assert!(dispatcher.attempts().is_empty());

    *store.broken.lock().unwrap() = false;
    let report = sweep.tick_at(tuesday_noon()).await.unwrap();
    assert_eq!(report.delivered, 1);
}

#[tokio::test]
async fn registrations_during_fan_out_do_not_disturb_tick() {
    /// Registers a new subscription from inside every delivery.
    struct Registering {
        registry: Arc<InMemorySubscriptionRegistry>,
        seen: Mutex<usize>,
    }

    #[async_trait]
    impl Dispatcher for Registering {
        fn name(&self) -> &str {
            "registering"
        }

        async fn deliver(&self, s: &Subscription, _p: &ReminderPayload) -> Result<(), DispatchError> {
            self.registry.register(sub(&format!("{}-late", s.endpoint)));
            *self.seen.lock().unwrap() += 1;
            tokio::task::yield_now().await;
            Ok(())
        }
    }

    let store = Arc::new(SqliteTaskStore::in_memory().unwrap());
    store.create_task(day(2), "Gym", "18:00").unwrap();
    let registry = Arc::new(InMemorySubscriptionRegistry::new());
    for i in 0..5 {
        registry.register(sub(&format!("https://push/{i}")));
    }
    let dispatcher = Arc::new(Registering {
        registry: registry.clone(),
        seen: Mutex::new(0),
    });
    let sweep = ReminderSweep::new(store, registry.clone(), dispatcher.clone(), SweepSettings::default());

    let report = sweep.tick_at(tuesday_noon()).await.unwrap();
    // the tick works from the snapshot taken before fan-out
    assert_eq!(report.attempted, 5);
    assert_eq!(*dispatcher.seen.lock().unwrap(), 5);
    assert_eq!(registry.len(), 10);
}

#[tokio::test(start_paused = true)]
async fn run_loop_ticks_until_shutdown() {
    let settings = SweepSettings {
        interval: Duration::from_secs(60),
        utc_offset: FixedOffset::east_opt(0),
        dedupe: false,
        ..SweepSettings::default()
    };
    let store = Arc::new(SqliteTaskStore::in_memory().unwrap());
    let (_, target) = target_day(&Utc::now());
    store.create_task(target, "Gym", "18:00").unwrap();
    let registry = Arc::new(InMemorySubscriptionRegistry::new());
    registry.register(sub("https://push/S1"));
    let dispatcher = Arc::new(ScriptedDispatcher::default());
    let sweep = Arc::new(ReminderSweep::new(store, registry, dispatcher.clone(), settings));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(sweep.run(shutdown_rx));

    // ticks at t = 0, 60, 120
    tokio::time::sleep(Duration::from_secs(150)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert_eq!(dispatcher.attempts().len(), 3);
}

#[tokio::test]
async fn unconfigured_dispatcher_skips_fan_out() {
    let store = Arc::new(SqliteTaskStore::in_memory().unwrap());
    store.create_task(day(2), "Gym", "18:00").unwrap();
    store.create_task(day(2), "Swim", "07:00").unwrap();
    let registry = Arc::new(InMemorySubscriptionRegistry::new());
    registry.register(sub("https://push/S1"));
    registry.register(sub("https://push/S2"));
    let sweep = ReminderSweep::new(
        store,
        registry,
        Arc::new(NullDispatcher),
        SweepSettings::default(),
    );

    let report = sweep.tick_at(tuesday_noon()).await.unwrap();
    assert_eq!(report.matched, 2);
    assert_eq!(report.attempted, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.unconfigured, 4);
    assert!(sweep.ledger().is_empty());
}
