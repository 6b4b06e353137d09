//! Water Level Web Server - Axum + Leptos SSR
//!
//! Serves the dashboard, analysis and settings pages and a JSON API over the
//! shared dashboard state. Live readings are pushed to browsers over a
//! WebSocket.

pub mod api;
pub mod ui;
pub mod ws;

use axum::http::{header, HeaderValue};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::{FixedOffset, Offset, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use water_level_core::loader::{LoadOutcome, WindowLoader};
use water_level_core::recording::{RecorderHandle, DEFAULT_RECORDING_INTERVAL};
use water_level_core::state::{Action, DashboardState};
use water_level_core::store::{RealtimeStore, Subscription};
use water_level_core::Granularity;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    /// Realtime database holding the live reading and its history
    pub store: Arc<dyn RealtimeStore>,
    /// Dashboard view state, only ever changed through the reducer
    pub dashboard: Arc<Mutex<DashboardState>>,
    /// Running recording, if any
    pub recorder: Arc<Mutex<Option<RecorderHandle>>>,
    /// WebSocket broadcast channel
    pub ws_tx: broadcast::Sender<String>,
    /// Server configuration
    pub config: ServerConfig,
}

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind address
    pub bind_addr: String,
    /// Display time zone as minutes east of UTC
    pub utc_offset_minutes: i32,
    /// Poll interval of recordings started from the dashboard
    pub recording_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8920,
            bind_addr: "0.0.0.0".to_string(),
            utc_offset_minutes: 7 * 60,
            recording_interval: DEFAULT_RECORDING_INTERVAL,
        }
    }
}

impl ServerConfig {
    /// Display offset; UTC when the configured minutes are out of range
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

impl AppState {
    pub fn new(store: Arc<dyn RealtimeStore>, config: ServerConfig) -> Self {
        let (ws_tx, _) = broadcast::channel(256);
        Self {
            store,
            dashboard: Arc::new(Mutex::new(DashboardState::new())),
            recorder: Arc::new(Mutex::new(None)),
            ws_tx,
            config,
        }
    }

    /// Lock the dashboard state. Never hold the guard across `.await`.
    pub fn dashboard(&self) -> MutexGuard<'_, DashboardState> {
        self.dashboard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> DashboardState {
        self.dashboard().clone()
    }

    pub fn dispatch(&self, action: Action) {
        self.dashboard().dispatch(action);
    }

    /// Fetch a window for `range` under a new generation
    ///
    /// The outcome is handed to the reducer, which drops it if another
    /// fetch started in the meantime. The caller always gets the window it
    /// asked for.
    pub async fn load_range(&self, range: Granularity) -> LoadOutcome {
        let (generation, live) = {
            let mut dashboard = self.dashboard();
            if dashboard.range == range {
                dashboard.dispatch(Action::Refresh);
            } else {
                dashboard.dispatch(Action::SelectRange(range));
            }
            (dashboard.generation, dashboard.live)
        };

        let outcome = WindowLoader::new(self.store.as_ref())
            .load(range, live)
            .await;
        tracing::debug!(
            %range,
            generation,
            samples = outcome.window.len(),
            source = ?outcome.source,
            "Window loaded"
        );

        self.dispatch(Action::WindowLoaded {
            generation,
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Feed live readings into the dashboard and out to WebSocket clients
    ///
    /// Delivery stops when the returned subscription is dropped.
    pub fn watch_live(&self) -> Subscription {
        let state = self.clone();
        self.store.subscribe_current(Box::new(move |reading| {
            state.dispatch(Action::LiveUpdated(reading));
            ws::broadcast_update(&state);
        }))
    }
}

/// Serve the PWA manifest.json
async fn serve_manifest() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/manifest+json")],
        ui::MANIFEST_JSON,
    )
}

/// Build the Axum router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Leptos SSR pages
        .route("/", get(ui::dashboard::dashboard_page))
        .route("/analysis", get(ui::analysis::analysis_page))
        .route("/settings", get(ui::settings::settings_page))
        // REST API
        .route("/api/v1/status", get(api::get_status))
        .route("/api/v1/current", get(api::get_current))
        .route("/api/v1/analysis", get(api::get_analysis))
        .route("/api/v1/state", get(api::get_state))
        .route("/api/v1/state/dismiss", post(api::dismiss_diagnostic))
        .route("/api/v1/export.csv", get(api::export_csv))
        .route("/api/v1/recording", get(api::recording_status))
        .route("/api/v1/recording/start", post(api::start_recording))
        .route("/api/v1/recording/stop", post(api::stop_recording))
        .route(
            "/api/v1/settings",
            get(api::get_settings).patch(api::update_settings),
        )
        .route("/api/v1/remote-url", get(api::get_remote_url))
        // WebSocket
        .route("/api/v1/ws", get(ws::ws_handler))
        // PWA manifest
        .route("/manifest.json", get(serve_manifest))
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

/// Serve on an already bound listener until the server stops
///
/// Subscribes to live readings and loads the initial window in the
/// background so the first page render never waits on the store.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let _live = state.watch_live();

    let initial = state.clone();
    tokio::spawn(async move {
        let range = initial.snapshot().range;
        initial.load_range(range).await;
    });

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Start the web server
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.bind_addr, state.config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, store = state.store.kind(), "Water level dashboard listening");

    serve(listener, state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use water_level_core::store::MemoryStore;
    use water_level_core::{LiveReading, Sample, WindowSource};

    fn test_state(store: MemoryStore) -> AppState {
        AppState::new(Arc::new(store), ServerConfig::default())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8920);
        assert_eq!(config.offset().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_invalid_offset_falls_back_to_utc() {
        let config = ServerConfig {
            utc_offset_minutes: 100_000,
            ..ServerConfig::default()
        };
        assert_eq!(config.offset().local_minus_utc(), 0);
    }

    #[tokio::test]
    async fn test_load_range_updates_dashboard() {
        let store = MemoryStore::with_history(vec![
            Sample::new(1_000, 1.0, 0.0),
            Sample::new(2_000, 1.2, 0.0),
        ]);
        let state = test_state(store);

        let outcome = state.load_range(Granularity::Weekly).await;
        assert_eq!(outcome.source, WindowSource::Store);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.range, Granularity::Weekly);
        assert_eq!(snapshot.generation, 1);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.window.len(), 2);
    }

    #[tokio::test]
    async fn test_watch_live_dispatches_updates() {
        let store = MemoryStore::new();
        let state = test_state(store.clone());
        let subscription = state.watch_live();

        store.set_current(LiveReading::new(2.1, 0.0));
        for _ in 0..50 {
            if state.snapshot().live.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(state.snapshot().live, Some(LiveReading::new(2.1, 0.0)));
        subscription.unsubscribe();
    }
}
