//! `taskpush-scheduler`: the "due tomorrow" reminder sweep.
//!
//! # Overview
//!
//! [`engine::ReminderSweep`] wakes on a fixed interval, reads every task,
//! keeps the ones whose weekday is tomorrow's, and pushes one reminder per
//! (task, subscription) pair. Deliveries run concurrently and fail
//! independently; a failed store read only costs that tick.
//!
//! | Step            | Where                              |
//! |-----------------|------------------------------------|
//! | target weekday  | [`schedule::target_day`]           |
//! | filter          | [`schedule::due_tomorrow`]         |
//! | payload         | [`schedule::build_payload`]        |
//! | at-most-once    | [`ledger::NotifiedLedger`]         |
//! | fan-out + loop  | [`engine::ReminderSweep`]          |

pub mod engine;
pub mod error;
pub mod ledger;
pub mod schedule;
pub mod types;

pub use engine::ReminderSweep;
pub use error::{Result, SweepError};
pub use ledger::NotifiedLedger;
pub use types::{SweepSettings, TickReport};
