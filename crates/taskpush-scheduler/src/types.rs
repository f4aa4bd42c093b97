use std::time::Duration;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;
use taskpush_core::{
    config::{
        ReminderConfig, DEFAULT_DELIVERY_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_DELIVERIES,
        DEFAULT_SWEEP_INTERVAL_SECS,
    },
    reminder::{DEFAULT_TITLE, DEFAULT_VIBRATE},
    DayOfWeek,
};

use crate::error::{Result, SweepError};

/// Runtime knobs for [`crate::ReminderSweep`].
#[derive(Debug, Clone)]
pub struct SweepSettings {
    /// Time between ticks.
    pub interval: Duration,
    /// Offset used to decide what "today" is. `None` = host local time.
    pub utc_offset: Option<FixedOffset>,
    /// Skip tasks already reminded about for the same target date.
    pub dedupe: bool,
    /// Upper bound on one delivery attempt.
    pub delivery_timeout: Duration,
    /// Deliveries in flight at once within a tick.
    pub max_concurrent_deliveries: usize,
    pub title: String,
    pub vibrate: Vec<u64>,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            utc_offset: None,
            dedupe: true,
            delivery_timeout: Duration::from_secs(DEFAULT_DELIVERY_TIMEOUT_SECS),
            max_concurrent_deliveries: DEFAULT_MAX_CONCURRENT_DELIVERIES,
            title: DEFAULT_TITLE.to_string(),
            vibrate: DEFAULT_VIBRATE.to_vec(),
        }
    }
}

impl SweepSettings {
    pub fn from_config(config: &ReminderConfig) -> Result<Self> {
        let utc_offset = match config.utc_offset_minutes {
            Some(minutes) => Some(
                minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        SweepError::InvalidSettings(format!(
                            "utc_offset_minutes out of range: {minutes}"
                        ))
                    })?,
            ),
            None => None,
        };
        if config.interval_secs == 0 {
            return Err(SweepError::InvalidSettings(
                "interval_secs must be greater than zero".to_string(),
            ));
        }
        if config.delivery_timeout_secs == 0 {
            return Err(SweepError::InvalidSettings(
                "delivery_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            interval: Duration::from_secs(config.interval_secs),
            utc_offset,
            dedupe: config.dedupe,
            delivery_timeout: Duration::from_secs(config.delivery_timeout_secs),
            max_concurrent_deliveries: config.max_concurrent_deliveries.max(1),
            title: config.title.clone(),
            vibrate: config.vibrate.clone(),
        })
    }
}

/// What one tick did. Logged by the loop; handy in tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub target_date: NaiveDate,
    pub target_day: DayOfWeek,
    /// Tasks whose day matched tomorrow.
    pub matched: usize,
    /// Matched tasks skipped because they were already reminded about.
    pub skipped_notified: usize,
    /// (task, subscription) deliveries attempted.
    pub attempted: usize,
    pub delivered: usize,
    /// Includes timeouts.
    pub failed: usize,
    /// (task, subscription) pairs dropped because push is not configured.
    pub unconfigured: usize,
}

impl TickReport {
    pub fn new(target_date: NaiveDate, target_day: DayOfWeek) -> Self {
        Self {
            target_date,
            target_day,
            matched: 0,
            skipped_notified: 0,
            attempted: 0,
            delivered: 0,
            failed: 0,
            unconfigured: 0,
        }
    }
}
