//! Standalone test server for E2E testing
//!
//! Starts the Axum server on an in-memory store seeded with a day of hourly
//! history and a live reading, so every page and endpoint works without a
//! hosted database.

use chrono::Utc;
use std::sync::Arc;
use water_level_core::loader::synthesize;
use water_level_core::store::MemoryStore;
use water_level_core::{Granularity, LiveReading};
use water_level_server::{AppState, ServerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("water_level=debug".parse().unwrap()),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8920u16);

    let live = LiveReading::default();
    let history = synthesize(
        Granularity::Daily,
        live,
        Utc::now().timestamp_millis(),
        &mut rand::rng(),
    );
    let store = MemoryStore::with_history(history);
    store.set_current(live);

    let config = ServerConfig {
        port,
        bind_addr: "127.0.0.1".to_string(),
        ..ServerConfig::default()
    };
    let state = AppState::new(Arc::new(store), config);

    tracing::info!(port, "Test server starting");

    if let Err(e) = water_level_server::start_server(state).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
