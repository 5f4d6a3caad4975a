//! `vault` — background service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Load or create the session key and seed [`KeyStore`].
//! 4. Build the Axum router and serve the loopback message channel.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use vault::codec::Codec;
use vault::config::Config;
use vault::key::{self, FileStorage, KeyStore};
use vault::server::{self, state::AppState};
use vault::service::MessageService;
use vault::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.listen_port,
        "vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Session key
    // -----------------------------------------------------------------------
    // Requests are only accepted after this completes. On failure the
    // service still starts and rejects every message as key-unavailable.
    let storage = FileStorage::new(&cfg.storage_path);
    info!(path = %storage.path().display(), "using storage area");
    let key_store = KeyStore::new(Arc::new(storage));
    key::startup(&key_store).await;

    // -----------------------------------------------------------------------
    // 4. Message channel
    // -----------------------------------------------------------------------
    let state = AppState::new(MessageService::new(Codec::new(key_store)));
    let router = server::router::build(state);

    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("vault stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
