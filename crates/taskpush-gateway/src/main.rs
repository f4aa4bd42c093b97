use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use taskpush_core::config::TaskpushConfig;
use taskpush_push::{
    Dispatcher, InMemorySubscriptionRegistry, NullDispatcher, SubscriptionRegistry,
    WebPushDispatcher,
};
use taskpush_scheduler::{ReminderSweep, SweepSettings};
use taskpush_tasks::{SqliteTaskStore, TaskStore};
use taskpush_users::UserStore;
use tracing::{info, warn};

mod app;
mod http;

#[derive(Parser)]
#[command(name = "taskpush-gateway", version, about = "Weekly task reminders over Web Push")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "TASKPUSH_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskpush_gateway=info,taskpush_scheduler=info,tower_http=debug".into()
            }),
        )
        .init();

    // load config: --config / TASKPUSH_CONFIG > ~/.taskpush/taskpush.toml
    let config = TaskpushConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        TaskpushConfig::default()
    });

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL;")?;
    taskpush_users::db::init_db(&db)?;
    taskpush_tasks::db::init_db(&db)?;
    info!("database migrations complete");

    // each subsystem gets its own connection
    let users = UserStore::new(rusqlite::Connection::open(db_path)?)?;
    let http_tasks: Arc<dyn TaskStore> =
        Arc::new(SqliteTaskStore::new(rusqlite::Connection::open(db_path)?)?);
    let sweep_tasks: Arc<dyn TaskStore> =
        Arc::new(SqliteTaskStore::new(rusqlite::Connection::open(db_path)?)?);

    let subscriptions: Arc<dyn SubscriptionRegistry> =
        Arc::new(InMemorySubscriptionRegistry::new());

    let (dispatcher, vapid_public_key): (Arc<dyn Dispatcher>, Option<String>) =
        match WebPushDispatcher::from_config(&config.push)? {
            Some(webpush) => {
                let key = webpush.public_key().to_string();
                (Arc::new(webpush), Some(key))
            }
            None => {
                warn!("push.vapid_public_key / push.vapid_private_key not set: reminders will not be delivered");
                (Arc::new(NullDispatcher), None)
            }
        };

    let settings = SweepSettings::from_config(&config.reminders)?;
    let sweep = Arc::new(ReminderSweep::new(
        sweep_tasks,
        Arc::clone(&subscriptions),
        dispatcher,
        settings,
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweep_task = tokio::spawn(sweep.run(shutdown_rx));

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let state = Arc::new(app::AppState::new(
        config,
        users,
        http_tasks,
        subscriptions,
        vapid_public_key,
    ));
    let router = app::build_router(state);

    info!("taskpush gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // signal the sweep to stop and let an in-flight tick finish
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweep_task.await {
        warn!("reminder sweep ended abnormally: {e}");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
