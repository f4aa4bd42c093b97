use rusqlite::Connection;

use crate::error::Result;

/// Initialise the task schema in `conn`.
///
/// Creates the `tasks` table (idempotent). `day` is checked at the SQL layer
/// too, so a row written by another tool cannot carry an unknown weekday.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id          TEXT    NOT NULL PRIMARY KEY,
            day         INTEGER NOT NULL CHECK (day BETWEEN 0 AND 6), -- 0 = Monday
            name        TEXT    NOT NULL,
            time        TEXT    NOT NULL,   -- free-form clock text, e.g. 18:00
            created_at  TEXT    NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_tasks_day ON tasks (day);
        ",
    )?;
    Ok(())
}
