//! Souk API server entry point.
//!
//! Configuration comes from `SOUK_*` environment variables; see
//! `ApiConfig`, `AuthConfig`, and `MetricsConfig`. Set `SOUK_SEED=1` to
//! populate the in-memory store with demo accounts and listings.

use souk_api::seed::seed_demo_data;
use souk_api::{init_metrics, ApiConfig, AppState, AuthConfig, MetricsConfig};
use souk_core::MemoryStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        tracing::warn!(error = %e, "metrics exporter not installed");
    }

    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_config(ApiConfig::from_env(), store.clone())
        .with_auth(AuthConfig::from_env());

    let seed_requested = std::env::var("SOUK_SEED")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);
    if seed_requested {
        seed_demo_data(&store, &state.resolver).await?;
    }

    souk_api::start_server(state).await?;

    Ok(())
}
