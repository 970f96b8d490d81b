//! precache-mcp server entry point.
//!
//! Loads configuration, opens the cache database, registers the configured
//! worker version and serves MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use precache_client::{FetchClient, FetchConfig, Registration, WorkerConfig};
use precache_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        version = %config.version,
        db = %config.db_path.display(),
        "Starting precache server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network = FetchClient::new(FetchConfig::from_app(&config)?)?;
    let registration = Registration::new(db, Arc::new(network));

    let report = registration.register(WorkerConfig::from_app(&config)?).await?;
    if let Some(error) = &report.install.error {
        tracing::warn!(store = %report.store_name, "worker installed without its manifest: {error}");
    }
    let client = registration.open_client().await;

    let state = state::AppState { config, registration, client };
    let handler = handler::PrecacheServer::new(Arc::new(state));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
