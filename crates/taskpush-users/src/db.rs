use rusqlite::{Connection, Result};

/// Initialise the users table. Safe to call on every startup:
/// CREATE IF NOT EXISTS means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    // UNIQUE(username) backs the AlreadyExists check against concurrent registers.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY NOT NULL,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,  -- argon2id PHC string
            created_at      TEXT NOT NULL
        );",
    )
}
