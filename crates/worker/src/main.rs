use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use realty_worker::config::WorkerConfig;
use realty_worker::poller::ActionPoller;
use realty_workflow::LoggingActionExecutor;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realty_worker=debug,realty_workflow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    tracing::info!(
        poll_interval_secs = config.poll_interval.as_secs(),
        batch_size = config.batch_size,
        "Loaded worker configuration"
    );

    let pool = realty_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    realty_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    realty_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let cancel = CancellationToken::new();
    let poller = ActionPoller::new(
        pool,
        Arc::new(LoggingActionExecutor),
        config.poll_interval,
        config.batch_size,
    );
    let poller_handle = tokio::spawn(poller.run(cancel.clone()));

    shutdown_signal().await;
    cancel.cancel();
    let _ = poller_handle.await;

    tracing::info!("Worker stopped");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
