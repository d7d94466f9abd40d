//! bookstore-api - Bookstore inventory microservice
//!
//! Ingests inventory CSV uploads into the shared SQLite database and serves
//! per-store PDF sales reports.

use anyhow::{Context, Result};
use bookstore_common::config::{load_toml_config, ConfigOverrides, RunMode, ServiceConfig};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bookstore_api::{build_router, AppState};

/// Command-line arguments for bookstore-api
#[derive(Parser, Debug)]
#[command(name = "bookstore-api")]
#[command(about = "Bookstore inventory ingestion and reporting service")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to <config dir>/bookstore/config.toml)
    #[arg(short, long, env = "BOOKSTORE_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "BOOKSTORE_DATABASE")]
    database: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "BOOKSTORE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Directory for staging uploaded files
    #[arg(long, env = "BOOKSTORE_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Largest accepted upload body in bytes
    #[arg(long, env = "BOOKSTORE_MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,

    /// Entries per ranked list in store reports
    #[arg(long, env = "BOOKSTORE_REPORT_LIMIT")]
    report_limit: Option<usize>,

    /// Run mode: development or production
    #[arg(long, env = "BOOKSTORE_ENV")]
    mode: Option<RunMode>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "BOOKSTORE_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            upload_dir: self.upload_dir.clone(),
            max_upload_bytes: self.max_upload_bytes,
            report_limit: self.report_limit,
            mode: self.mode,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;
    let config = ServiceConfig::resolve(args.overrides(), toml);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "bookstore_api={level},bookstore_common={level},tower_http={level}",
                level = config.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting bookstore-api v{} ({} mode)",
        env!("CARGO_PKG_VERSION"),
        config.mode
    );
    info!("Database: {}", config.database_path.display());
    info!("Upload staging directory: {}", config.upload_dir.display());

    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    let pool = bookstore_common::db::init_database(&config.database_path)
        .await
        .context("Failed to connect to database. Please check your configuration.")?;
    info!("Database connection established");

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("bookstore-api stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
