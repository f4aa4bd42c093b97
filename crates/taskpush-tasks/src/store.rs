use std::sync::Mutex;

use chrono::Utc;
use rusqlite::Connection;
use taskpush_core::DayOfWeek;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::init_db,
    error::{Result, TaskStoreError},
    types::Task,
};

/// Durable task CRUD. The reminder sweep only ever calls [`TaskStore::list_tasks`].
pub trait TaskStore: Send + Sync {
    fn create_task(&self, day: DayOfWeek, name: &str, time: &str) -> Result<Task>;

    /// Every stored task, oldest first. No filtering happens at this layer.
    fn list_tasks(&self) -> Result<Vec<Task>>;

    fn get_task(&self, id: &str) -> Result<Option<Task>>;

    /// Returns `NotFound` if no row is deleted.
    fn delete_task(&self, id: &str) -> Result<()>;
}

/// SQLite-backed [`TaskStore`].
///
/// Owns its own `Connection` so HTTP handlers and the sweep never contend on a
/// connection shared with another subsystem.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, mainly for tests and throwaway runs.
    pub fn in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }
}

impl TaskStore for SqliteTaskStore {
    #[instrument(skip(self))]
    fn create_task(&self, day: DayOfWeek, name: &str, time: &str) -> Result<Task> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaskStoreError::InvalidTask(
                "name cannot be empty".to_string(),
            ));
        }
        let time = time.trim();

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tasks (id, day, name, time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, day.index(), name, time, now],
        )?;
        info!(task_id = %id, %name, "task created");

        Ok(Task {
            id,
            day,
            name: name.to_string(),
            time: time.to_string(),
            created_at: now,
        })
    }

    fn list_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT id, day, name, time, created_at
             FROM tasks ORDER BY created_at, id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?, // id
                    row.get::<_, i64>(1)?,    // day
                    row.get::<_, String>(2)?, // name
                    row.get::<_, String>(3)?, // time
                    row.get::<_, String>(4)?, // created_at
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let tasks = rows
            .into_iter()
            .filter_map(|(id, day, name, time, created_at)| {
                match row_to_task(id, day, name, time, created_at) {
                    Ok(task) => Some(task),
                    Err(e) => {
                        warn!("skipping task row: {e}");
                        None
                    }
                }
            })
            .collect();
        Ok(tasks)
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let conn = self.conn.lock().unwrap();
        let row = conn.query_row(
            "SELECT id, day, name, time, created_at FROM tasks WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        );
        match row {
            Ok((id, day, name, time, created_at)) => {
                row_to_task(id, day, name, time, created_at).map(Some)
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(TaskStoreError::NotFound { id: id.to_string() });
        }
        info!(task_id = %id, "task deleted");
        Ok(())
    }
}

fn row_to_task(
    id: String,
    day: i64,
    name: String,
    time: String,
    created_at: String,
) -> Result<Task> {
    let day = DayOfWeek::try_from(day).map_err(|e| TaskStoreError::Corrupt {
        id: id.clone(),
        reason: e.to_string(),
    })?;
    Ok(Task {
        id,
        day,
        name,
        time,
        created_at,
    })
}
