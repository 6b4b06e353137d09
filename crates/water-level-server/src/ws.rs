//! WebSocket handler for real-time water-level push
//!
//! Clients connect to /api/v1/ws and receive a JSON snapshot immediately and
//! then one per live reading.

use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use water_level_core::gauge::GaugeReading;
use water_level_core::stats::engine::{Alert, RoundedStatistics};
use water_level_core::LiveReading;

/// Pushed to every client on each live update
#[derive(Serialize, Debug)]
pub struct LiveUpdate {
    pub live: LiveReading,
    /// False until the store has delivered a reading
    pub available: bool,
    pub gauge: GaugeReading,
    pub message: String,
    pub statistics: RoundedStatistics,
    pub alerts: Vec<Alert>,
    pub generation: u64,
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Build the update JSON (lock is released before returning)
pub fn build_update_json(state: &AppState) -> Option<String> {
    let update = {
        let dashboard = state.dashboard();
        let live = dashboard.live_or_default();
        let gauge = GaugeReading::from_height(live.height);
        LiveUpdate {
            live,
            available: dashboard.live.is_some(),
            gauge,
            message: gauge.status.message().to_string(),
            statistics: dashboard.statistics.rounded(),
            alerts: dashboard.statistics.alerts.clone(),
            generation: dashboard.generation,
        }
    };
    serde_json::to_string(&update).ok()
}

/// Push live updates to one browser until either side goes away
///
/// The client first gets the current snapshot, then one message per live
/// reading. A client that falls behind the broadcast buffer skips the missed
/// updates; the next one carries the full state anyway.
async fn handle_ws(socket: WebSocket, state: AppState) {
    let (mut outgoing, mut incoming) = socket.split();

    // Subscribe first so a reading arriving during the snapshot is not lost
    let mut updates = state.ws_tx.subscribe();

    if let Some(json) = build_update_json(&state) {
        if outgoing.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(json) => {
                    if outgoing.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "WebSocket client lagging, skipping updates");
                }
                Err(RecvError::Closed) => break,
            },
            frame = incoming.next() => match frame {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("WebSocket client disconnected");
}

/// Send the current snapshot to every connected client
///
/// Runs once per live reading; skipped when nobody is listening.
pub fn broadcast_update(state: &AppState) {
    if state.ws_tx.receiver_count() == 0 {
        return;
    }

    if let Some(json) = build_update_json(state) {
        let _ = state.ws_tx.send(json);
    }
}
