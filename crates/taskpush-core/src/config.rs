use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::reminder::{DEFAULT_TITLE, DEFAULT_VIBRATE};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60; // once per minute
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONCURRENT_DELIVERIES: usize = 32;
pub const DEFAULT_PUSH_TTL_SECS: u32 = 24 * 60 * 60;

/// Top-level config (taskpush.toml + TASKPUSH_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskpushConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Web Push (VAPID) settings. Without both keys the gateway falls back to a
/// dispatcher that rejects every delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Contact URI sent as the VAPID `sub` claim, e.g. `mailto:ops@example.com`.
    #[serde(default = "default_vapid_subject")]
    pub vapid_subject: String,
    /// Uncompressed P-256 public key, base64url (65 bytes decoded).
    pub vapid_public_key: Option<String>,
    /// Raw P-256 private scalar, base64url (32 bytes decoded).
    pub vapid_private_key: Option<String>,
    /// How long the push service should hold an undelivered message.
    #[serde(default = "default_push_ttl")]
    pub ttl_secs: u32,
    /// Per-request HTTP timeout towards the push service.
    #[serde(default = "default_delivery_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            vapid_subject: default_vapid_subject(),
            vapid_public_key: None,
            vapid_private_key: None,
            ttl_secs: DEFAULT_PUSH_TTL_SECS,
            request_timeout_secs: DEFAULT_DELIVERY_TIMEOUT_SECS,
        }
    }
}

impl PushConfig {
    /// Both halves of the VAPID key pair, if configured.
    pub fn vapid_keys(&self) -> Option<(&str, &str)> {
        match (&self.vapid_public_key, &self.vapid_private_key) {
            (Some(public), Some(private)) if !public.is_empty() && !private.is_empty() => {
                Some((public.as_str(), private.as_str()))
            }
            _ => None,
        }
    }
}

/// Reminder sweep settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Seconds between sweep ticks.
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
    /// Fixed offset used to decide what "tomorrow" is. `None` = host local time.
    pub utc_offset_minutes: Option<i32>,
    /// At most one reminder per task per day.
    #[serde(default = "bool_true")]
    pub dedupe: bool,
    /// Upper bound on a single delivery attempt, including the HTTP round trip.
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_secs: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_deliveries: usize,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u64>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            utc_offset_minutes: None,
            dedupe: true,
            delivery_timeout_secs: DEFAULT_DELIVERY_TIMEOUT_SECS,
            max_concurrent_deliveries: DEFAULT_MAX_CONCURRENT_DELIVERIES,
            title: default_title(),
            vibrate: default_vibrate(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.taskpush/taskpush.db", home)
}
fn default_vapid_subject() -> String {
    "mailto:admin@localhost".to_string()
}
fn default_push_ttl() -> u32 {
    DEFAULT_PUSH_TTL_SECS
}
fn default_sweep_interval() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}
fn default_delivery_timeout() -> u64 {
    DEFAULT_DELIVERY_TIMEOUT_SECS
}
fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT_DELIVERIES
}
fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
fn default_vibrate() -> Vec<u64> {
    DEFAULT_VIBRATE.to_vec()
}

impl TaskpushConfig {
    /// Load config from a TOML file with TASKPUSH_* env var overrides.
    ///
    /// Nested keys use a double underscore: `TASKPUSH_SERVER__PORT=9000`.
    /// A missing file is not an error; every section has defaults.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        tracing::debug!(path = %path, "loading config");

        let config: TaskpushConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("TASKPUSH_").split("__"))
            .extract()
            .map_err(|e| crate::error::TaskpushError::Config(e.to_string()))?;

        if config.reminders.interval_secs == 0 {
            return Err(crate::error::TaskpushError::Config(
                "reminders.interval_secs must be greater than zero".to_string(),
            ));
        }
        if config.reminders.max_concurrent_deliveries == 0 {
            return Err(crate::error::TaskpushError::Config(
                "reminders.max_concurrent_deliveries must be greater than zero".to_string(),
            ));
        }
        if config.reminders.delivery_timeout_secs == 0 {
            return Err(crate::error::TaskpushError::Config(
                "reminders.delivery_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if config.push.request_timeout_secs == 0 {
            return Err(crate::error::TaskpushError::Config(
                "push.request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.taskpush/taskpush.toml", home)
}
