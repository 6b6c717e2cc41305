//! Service entry point: flag and env resolution, logging, store init, serve.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clientdesk::config::{DatabaseBackend, DatabaseConfig, ServiceConfig, default_db_path};
use clientdesk::db;
use clientdesk::web::{AppState, start_server};

/// Client/project dashboard API server.
#[derive(Debug, Parser)]
#[command(name = "clientdesk", version, about)]
struct Cli {
    /// Address to bind the API server to.
    #[arg(long, env = "CLIENTDESK_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Storage backend: libsql (persistent) or memory.
    #[arg(long, env = "CLIENTDESK_BACKEND", default_value = "libsql")]
    backend: String,

    /// Path of the embedded database file. Defaults to the platform data dir.
    #[arg(long, env = "CLIENTDESK_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Origin allowed for cross-origin requests. Any origin when unset.
    #[arg(long, env = "CLIENTDESK_CORS_ORIGIN")]
    cors_origin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clientdesk=info")),
        )
        .init();

    let cli = Cli::parse();

    let backend = DatabaseBackend::from_str(&cli.backend).context("invalid --backend")?;
    let config = ServiceConfig {
        bind: cli.bind,
        database: DatabaseConfig {
            backend,
            libsql_path: cli.db_path.unwrap_or_else(default_db_path),
        },
        cors_origin: cli.cors_origin,
    };

    let store = db::connect_from_config(&config.database)
        .await
        .context("failed to open the record store")?;
    tracing::info!(
        backend = config.database.backend.as_str(),
        "record store ready"
    );

    let state = Arc::new(AppState::new(store));
    let bound = start_server(config.bind, Arc::clone(&state), config.cors_origin.as_deref())
        .await
        .context("failed to start the API server")?;
    tracing::info!("clientdesk listening on http://{}", bound);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");

    if let Some(tx) = state.shutdown_tx.write().await.take() {
        let _ = tx.send(());
    }

    Ok(())
}
