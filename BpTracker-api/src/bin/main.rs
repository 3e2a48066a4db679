use std::net::SocketAddr;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use bp_tracker_api::api::create_application;
use bp_tracker_api::config::AppConfig;
use bp_tracker_data::database::{self, DatabaseConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    info!("Starting BP Tracker API server");

    let config = AppConfig::from_env()?;

    if !config.data_dir.exists() {
        info!("Creating data directory: {}", config.data_dir.display());
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("Failed to create data directory {}", config.data_dir.display()))?;
    }

    // An explicit DB_SQLITE_PATH wins over the data directory
    match DatabaseConfig::from_env() {
        Ok(mut db_config) => {
            if std::env::var("DB_SQLITE_PATH").is_err() {
                db_config.sqlite_path = Some(config.database_path().to_string_lossy().into_owned());
            }
            match database::initialize_database_pool_with(&db_config) {
                Ok(()) => info!("Database pool initialized successfully"),
                Err(e) => error!("Failed to initialize database pool: {}", e),
            }
        }
        Err(e) => error!("Invalid database configuration: {}", e),
    }

    if let Some(description) = database::get_connection_info() {
        info!("Using {}", description);
    } else {
        warn!("No database pool; readings will be kept in memory only");
    }

    let app = create_application(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
