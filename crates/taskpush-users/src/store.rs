use std::sync::Mutex;

use rusqlite::{Connection, ErrorCode, OptionalExtension};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::db::init_db;
use crate::error::{Result, UserError};
use crate::password::{hash_password, verify_password};
use crate::types::User;

/// Account registration and login against the `users` table.
pub struct UserStore {
    db: Mutex<Connection>,
}

impl UserStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Create an account. Usernames are unique and compared after trimming.
    #[instrument(skip(self, password))]
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserError::InvalidInput("username cannot be empty".to_string()));
        }
        if password.is_empty() {
            return Err(UserError::InvalidInput("password cannot be empty".to_string()));
        }

        if self.find_by_username(username)?.is_some() {
            return Err(UserError::AlreadyExists(username.to_string()));
        }

        // Hash outside the lock.
        let password_hash = hash_password(password)?;
        let user = User {
            id: Uuid::now_v7().to_string(),
            username: username.to_string(),
            password_hash,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let db = self.db.lock().unwrap();
        let inserted = db.execute(
            "INSERT INTO users (id, username, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user.id, user.username, user.password_hash, user.created_at],
        );
        match inserted {
            Ok(_) => {}
            // Lost a race with a concurrent register for the same name.
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(UserError::AlreadyExists(user.username));
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Verify credentials and return the matching user.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let user = self
            .find_by_username(username)?
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "password mismatch");
            return Err(UserError::IncorrectPassword);
        }
        info!(user_id = %user.id, "login successful");
        Ok(user)
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let db = self.db.lock().unwrap();
        let user = db
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn count(&self) -> Result<u64> {
        let db = self.db.lock().unwrap();
        let n: i64 = db.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}
