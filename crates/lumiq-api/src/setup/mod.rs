//! Application setup and initialization
//!
//! All application initialization logic lives here instead of main.rs, so
//! integration tests can assemble the same router around a mock transport.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use lumiq_core::Config;
use lumiq_relay::{HttpRelayTransport, LeadDispatcher, RelayTransport, StatusStore};
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();

    tracing::info!("Configuration loaded and validated successfully");

    let transport: Arc<dyn RelayTransport> = Arc::new(
        HttpRelayTransport::new(config.relay.clone())
            .context("Failed to build relay transport")?,
    );
    let dispatcher = LeadDispatcher::new(&config, transport);
    let status_store = Arc::new(StatusStore::new());

    spawn_eviction_task(status_store.clone(), config.submission_ttl());

    let state = Arc::new(AppState {
        config: config.clone(),
        dispatcher,
        status_store,
    });

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}

/// Periodically drops settled submission records past their TTL so the
/// in-memory store stays bounded.
fn spawn_eviction_task(store: Arc<StatusStore>, ttl: Duration) {
    tracing::info!(
        ttl_seconds = ttl.as_secs(),
        "Submission record eviction task started (every 5 minutes)"
    );
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            store.evict_older_than(ttl).await;
        }
    });
}
