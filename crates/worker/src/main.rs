//! `vigil-worker` — the dead man's switch daemon.
//!
//! Composition root for the sweep: loads configuration, connects to the
//! database, picks the delivery transport, and runs the periodic sweep
//! until SIGINT or SIGTERM.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vigil_dispatch::{
    Delivery, DisabledDelivery, DispatchOrchestrator, SmtpConfig, SmtpDelivery, SweepScheduler,
};

use config::WorkerConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil_worker=debug,vigil_dispatch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    tracing::info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        delivery_timeout_secs = config.delivery_timeout.as_secs(),
        "Loaded worker configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = vigil_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    vigil_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    vigil_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Delivery transport ---
    let delivery: Arc<dyn Delivery> = match SmtpConfig::from_env() {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "SMTP delivery configured");
            Arc::new(SmtpDelivery::new(smtp).expect("Failed to build SMTP transport"))
        }
        None => {
            tracing::warn!(
                "SMTP_HOST not set; dispatch will be deferred until a transport is configured"
            );
            Arc::new(DisabledDelivery)
        }
    };

    // --- Sweep scheduler ---
    let orchestrator =
        DispatchOrchestrator::new(pool, delivery).with_delivery_timeout(config.delivery_timeout);
    let scheduler = SweepScheduler::new(orchestrator, config.sweep_interval);

    let cancel = CancellationToken::new();
    let sweep_cancel = cancel.clone();
    let sweep_handle = tokio::spawn(async move {
        scheduler.run(sweep_cancel).await;
    });

    tracing::info!("Worker started");

    // --- Shutdown ---
    shutdown_signal().await;

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
