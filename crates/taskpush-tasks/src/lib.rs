//! `taskpush-tasks`: durable task storage.
//!
//! Tasks live in a SQLite `tasks` table. Callers depend on the [`TaskStore`]
//! trait; [`SqliteTaskStore`] is the production implementation.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, TaskStoreError};
pub use store::{SqliteTaskStore, TaskStore};
pub use types::Task;
