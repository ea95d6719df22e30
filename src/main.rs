//! Seathold server — seat reservation and locking engine.
//!
//! Entry point that wires the engine crates together: loads
//! configuration, connects to PostgreSQL, runs migrations, and drives
//! the durable expiry sweep until shutdown. Transport layers (HTTP,
//! WebSocket) embed the engine crates directly and are not part of this
//! binary.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use seathold_core::config::AppConfig;
use seathold_core::error::AppError;
use seathold_core::traits::SeatNotifier;
use seathold_database::connection::DatabasePool;
use seathold_database::repositories::{ExpiryRepository, HoldRepository, SeatRepository};
use seathold_engine::{ExpiryService, RetryPolicy, TimerRegistry};
use seathold_realtime::SeatBroadcaster;
use seathold_worker::SweepRunner;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("SEATHOLD_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Seathold v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    seathold_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    let pool = db.into_pool();

    // ── Step 2: Repositories ─────────────────────────────────────
    let seats = Arc::new(SeatRepository::new(pool.clone()));
    let holds = Arc::new(HoldRepository::new(pool.clone()));
    let expiry_queue = Arc::new(ExpiryRepository::new(pool.clone()));

    // ── Step 3: Realtime broadcaster ─────────────────────────────
    let broadcaster = Arc::new(SeatBroadcaster::new(&config.realtime));
    let notifier: Arc<dyn SeatNotifier> = Arc::clone(&broadcaster) as Arc<dyn SeatNotifier>;

    // ── Step 4: Expiry release path ──────────────────────────────
    let timers = Arc::new(TimerRegistry::new());
    let expiry = Arc::new(ExpiryService::new(
        pool.clone(),
        Arc::clone(&seats),
        Arc::clone(&holds),
        Arc::clone(&expiry_queue),
        Arc::clone(&timers),
        notifier,
        RetryPolicy::from(&config.engine.retry),
    ));

    // ── Step 5: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 6: Start expiry sweep ───────────────────────────────
    let sweep_handle = if config.sweep.enabled {
        let runner = SweepRunner::new(
            Arc::clone(&expiry_queue),
            Arc::clone(&expiry),
            config.sweep.clone(),
        );
        let sweep_cancel = shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            runner.run(sweep_cancel).await;
        });
        tracing::info!("Expiry sweep started");
        Some(handle)
    } else {
        tracing::warn!("Expiry sweep disabled; lapsed holds will only be released lazily");
        None
    };

    tracing::info!(
        default_ttl_seconds = config.engine.default_ttl_seconds,
        max_seats_per_hold = config.engine.max_seats_per_hold,
        "Seathold engine ready"
    );

    // ── Step 7: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = sweep_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    tracing::info!("Seathold server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
