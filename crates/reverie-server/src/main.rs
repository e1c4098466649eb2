//! Replay server entry point.
//!
//! Serves recorded Reverie simulations, both archived and live, to the
//! replay dashboard over HTTP.
//!
//! # Configuration
//!
//! Storage locations come from `NSPLLM_STORAGE_ROOT` and
//! `NSPLLM_ARCHIVE_ROOT`; the listener from `OBSERVER_HOST` and
//! `OBSERVER_PORT`. Log filtering follows `RUST_LOG` (default `info`).

use std::sync::Arc;

use anyhow::Context;
use reverie_observer::{AppState, ServerConfig, start_server};
use reverie_replay::StorageConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// then serves requests until `Ctrl-C`.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server cannot
/// bind or serve.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("reverie-server starting");

    let storage = StorageConfig::from_env().context("loading storage configuration")?;
    info!(
        live_root = %storage.live_root.display(),
        archive_root = %storage.archive_root.display(),
        live_seconds_per_step = storage.live_seconds_per_step,
        max_page_limit = storage.max_page_limit,
        live_movement_enrichment = storage.live_movement_enrichment,
        "storage configuration loaded"
    );

    let server = ServerConfig::from_env().context("loading server configuration")?;
    let state = Arc::new(AppState::new(storage));

    start_server(&server, state)
        .await
        .context("replay server failed")?;

    Ok(())
}
