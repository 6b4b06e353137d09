//! REST API endpoints for the water-level dashboard
//!
//! All endpoints are under /api/v1/ and return JSON, except the CSV
//! downloads.

use crate::AppState;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use water_level_core::chart::{self, ChartData, Series};
use water_level_core::export;
use water_level_core::gauge::GaugeReading;
use water_level_core::loader::{LoadOutcome, WindowLoader, WindowSource};
use water_level_core::recording::{Recorder, RecorderHandle, Recording};
use water_level_core::state::{Action, DashboardState, Preferences, PreferencesPatch, Tab};
use water_level_core::stats::distribution::{self, DistributionBins};
use water_level_core::stats::engine::{self, round_to, Alert, AlertLevel, RoundedStatistics};
use water_level_core::{Granularity, LiveReading};

type ApiError = (StatusCode, String);

/// Application status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub build_date: String,
    /// Backend kind, `firebase` or `memory`
    pub store: String,
    /// True when the store currently holds a live reading
    pub live_available: bool,
    pub recording: bool,
}

/// Live reading response
#[derive(Serialize)]
pub struct CurrentResponse {
    pub height: f64,
    pub rate: f64,
    /// False when the defaults are shown because no reading was available
    pub available: bool,
    pub gauge: GaugeReading,
    pub message: String,
    pub error: Option<String>,
}

/// One prediction row of the analysis page
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PredictionResponse {
    pub hours: u32,
    pub height: f64,
    /// Change from the current live height
    pub delta: f64,
    pub level: Option<AlertLevel>,
}

#[derive(Serialize, Clone, Debug)]
pub struct DistributionResponse {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
    pub total: usize,
}

impl From<&DistributionBins> for DistributionResponse {
    fn from(bins: &DistributionBins) -> Self {
        Self {
            labels: DistributionBins::labels(),
            counts: bins.counts.to_vec(),
            total: bins.total(),
        }
    }
}

/// Everything the analysis page shows for one range
#[derive(Serialize, Clone, Debug)]
pub struct AnalysisResponse {
    pub range: Granularity,
    pub series: Series,
    pub source: WindowSource,
    pub diagnostic: Option<String>,
    pub sample_count: usize,
    pub statistics: RoundedStatistics,
    pub predictions: Vec<PredictionResponse>,
    pub alerts: Vec<Alert>,
    pub distribution: DistributionResponse,
    pub history_chart: ChartData,
    pub distribution_chart: ChartData,
}

impl AnalysisResponse {
    pub fn build(
        outcome: &LoadOutcome,
        live: LiveReading,
        series: Series,
        offset: FixedOffset,
    ) -> Self {
        let samples = outcome.window.samples();
        let statistics = engine::compute(samples, live);
        let bins = distribution::bin(samples);

        let predictions = statistics
            .predictions
            .by_horizon()
            .into_iter()
            .map(|(hours, height)| PredictionResponse {
                hours,
                height: round_to(height, 2),
                delta: round_to(height - live.height, 2),
                level: AlertLevel::for_height(height),
            })
            .collect();

        Self {
            range: outcome.window.granularity(),
            series,
            source: outcome.source,
            diagnostic: outcome.diagnostic.clone(),
            sample_count: samples.len(),
            statistics: statistics.rounded(),
            predictions,
            alerts: statistics.alerts.clone(),
            distribution: DistributionResponse::from(&bins),
            history_chart: chart::format_history(
                &outcome.window,
                &statistics.predictions,
                series,
                offset,
            ),
            distribution_chart: chart::format_distribution(&bins),
        }
    }
}

/// Dashboard state snapshot
#[derive(Serialize, Clone, Debug)]
pub struct StateResponse {
    pub tab: Tab,
    pub range: Granularity,
    pub series: Series,
    pub loading: bool,
    pub generation: u64,
    pub source: Option<WindowSource>,
    pub diagnostic: Option<String>,
    pub sample_count: usize,
    pub live: Option<LiveReading>,
}

impl From<&DashboardState> for StateResponse {
    fn from(state: &DashboardState) -> Self {
        Self {
            tab: state.tab,
            range: state.range,
            series: state.series,
            loading: state.loading,
            generation: state.generation,
            source: state.source,
            diagnostic: state.diagnostic.clone(),
            sample_count: state.window.len(),
            live: state.live,
        }
    }
}

/// Recording status response
#[derive(Serialize)]
pub struct RecordingResponse {
    pub active: bool,
    pub started_at_ms: Option<i64>,
    pub samples: usize,
    pub failed_polls: u64,
    pub interval_secs: u64,
}

/// Remote URL response
#[derive(Serialize)]
pub struct RemoteUrlResponse {
    pub url: String,
}

/// Query of the analysis endpoint; missing fields keep the current selection
#[derive(Deserialize, Default)]
pub struct AnalysisQuery {
    pub range: Option<String>,
    pub series: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ExportQuery {
    pub range: Option<String>,
}

/// Parse an optional query value, falling back to `current`
fn parse_or<T>(value: Option<&str>, current: T) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None | Some("") => Ok(current),
        Some(v) => v
            .parse()
            .map_err(|e: T::Err| (StatusCode::BAD_REQUEST, e.to_string())),
    }
}

/// CSV download response
fn csv_attachment(filename: String, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, export::CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let live_available = match state.store.fetch_current().await {
        Ok(reading) => reading.is_some(),
        Err(e) => {
            tracing::debug!(error = %e, "Live reading unavailable");
            false
        }
    };
    let recording = state
        .recorder
        .lock()
        .map(|r| r.as_ref().is_some_and(|h| h.is_alive()))
        .unwrap_or(false);

    Json(StatusResponse {
        version: water_level_core::VERSION.to_string(),
        build_date: water_level_core::BUILD_DATE.to_string(),
        store: state.store.kind().to_string(),
        live_available,
        recording,
    })
}

/// GET /api/v1/current
///
/// Reads the live path directly. When it is empty or unreachable the last
/// known reading (or the defaults) is returned with `available: false`.
pub async fn get_current(State(state): State<AppState>) -> Json<CurrentResponse> {
    let (reading, available, error) = match state.store.fetch_current().await {
        Ok(Some(reading)) => (reading, true, None),
        Ok(None) => (state.snapshot().live_or_default(), false, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read live value");
            (state.snapshot().live_or_default(), false, Some(e.to_string()))
        }
    };
    let gauge = GaugeReading::from_height(reading.height);

    Json(CurrentResponse {
        height: reading.height,
        rate: reading.rate,
        available,
        gauge,
        message: gauge.status.message().to_string(),
        error,
    })
}

/// GET /api/v1/analysis?range=&series=
///
/// Always fetches a fresh window; the response describes exactly the range
/// requested even if another request moves the dashboard on meanwhile.
pub async fn get_analysis(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let current = state.snapshot();
    let range = parse_or(query.range.as_deref(), current.range)?;
    let series = parse_or(query.series.as_deref(), current.series)?;

    {
        let mut dashboard = state.dashboard();
        dashboard.dispatch(Action::SelectTab(Tab::Analysis));
        if series != dashboard.series {
            dashboard.dispatch(Action::SelectSeries(series));
        }
    }

    let outcome = state.load_range(range).await;
    let live = state.snapshot().live_or_default();

    Ok(Json(AnalysisResponse::build(
        &outcome,
        live,
        series,
        state.config.offset(),
    )))
}

/// GET /api/v1/state
pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse::from(&state.snapshot()))
}

/// POST /api/v1/state/dismiss
pub async fn dismiss_diagnostic(State(state): State<AppState>) -> Json<StateResponse> {
    let snapshot = {
        let mut dashboard = state.dashboard();
        dashboard.dispatch(Action::DismissDiagnostic);
        StateResponse::from(&*dashboard)
    };
    Json(snapshot)
}

/// GET /api/v1/export.csv?range=
///
/// Exports the dashboard's window when it already holds the requested
/// range, otherwise loads one.
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let snapshot = state.snapshot();
    let range = parse_or(query.range.as_deref(), snapshot.range)?;
    let offset = state.config.offset();

    let body = if snapshot.range == range && !snapshot.window.is_empty() {
        export::to_csv(snapshot.window.samples(), offset)
    } else {
        let outcome = WindowLoader::new(state.store.as_ref())
            .load(range, snapshot.live)
            .await;
        export::to_csv(outcome.window.samples(), offset)
    };

    tracing::info!(%range, bytes = body.len(), "CSV export");
    Ok(csv_attachment(export::filename_today(offset), body))
}

fn recording_response(state: &AppState) -> RecordingResponse {
    let guard = state.recorder.lock().ok();
    let handle = guard.as_ref().and_then(|g| g.as_ref());
    RecordingResponse {
        active: handle.is_some_and(|h| h.is_alive()),
        started_at_ms: handle.map(|h| h.started_at_ms()),
        samples: handle.map(|h| h.samples_recorded()).unwrap_or(0),
        failed_polls: handle.map(|h| h.failed_polls()).unwrap_or(0),
        interval_secs: state.config.recording_interval.as_secs(),
    }
}

/// GET /api/v1/recording
pub async fn recording_status(State(state): State<AppState>) -> Json<RecordingResponse> {
    Json(recording_response(&state))
}

/// POST /api/v1/recording/start
pub async fn start_recording(
    State(state): State<AppState>,
) -> Result<Json<RecordingResponse>, ApiError> {
    {
        let mut recorder = state.recorder.lock().map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to acquire lock on recorder.".to_string(),
            )
        })?;
        retire_finished(&mut recorder)?;
        *recorder = Some(
            Recorder::new(state.config.recording_interval).start(state.store.clone()),
        );
    }
    Ok(Json(recording_response(&state)))
}

/// Clear the recorder slot for a new recording
///
/// A running recording is a conflict. A handle whose polling task has died is
/// stopped and its samples are logged as discarded.
fn retire_finished(slot: &mut Option<RecorderHandle>) -> Result<Option<Recording>, ApiError> {
    if slot.as_ref().is_some_and(|h| h.is_alive()) {
        return Err((
            StatusCode::CONFLICT,
            "Recording already running".to_string(),
        ));
    }
    let discarded = slot.take().map(RecorderHandle::stop);
    if let Some(recording) = &discarded {
        tracing::warn!(
            samples = recording.samples.len(),
            started_at_ms = recording.started_at_ms,
            "Recorder task had ended, discarding its samples"
        );
    }
    Ok(discarded)
}

/// POST /api/v1/recording/stop
///
/// Stops the recording and returns it as a CSV download.
pub async fn stop_recording(State(state): State<AppState>) -> Result<Response, ApiError> {
    let handle = state
        .recorder
        .lock()
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to acquire lock on recorder.".to_string(),
            )
        })?
        .take();
    let Some(handle) = handle else {
        return Err((
            StatusCode::CONFLICT,
            "No recording in progress".to_string(),
        ));
    };

    let recording = handle.stop();
    Ok(csv_attachment(
        recording.filename(),
        recording.to_csv(state.config.offset()),
    ))
}

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.snapshot().preferences)
}

/// PATCH /api/v1/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<Json<Preferences>, ApiError> {
    let preferences = {
        let mut dashboard = state.dashboard();
        let next = patch
            .apply(&dashboard.preferences)
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
        dashboard.dispatch(Action::UpdatePreferences(next.clone()));
        next
    };
    Ok(Json(preferences))
}

/// GET /api/v1/remote-url
///
/// Returns the URL for opening the dashboard from other devices on the LAN.
pub async fn get_remote_url(State(state): State<AppState>) -> Json<RemoteUrlResponse> {
    let ip = local_ip_address::local_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|_| "localhost".to_string());
    Json(RemoteUrlResponse {
        url: format!("http://{}:{}", ip, state.config.port),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use water_level_core::store::{
        LiveCallback, MemoryStore, RealtimeStore, StoreFuture, Subscription,
    };
    use water_level_core::{Sample, Window};

    /// Answers the first live read, then panics the polling task
    struct CrashingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    impl RealtimeStore for CrashingStore {
        fn kind(&self) -> &'static str {
            "crashing"
        }

        fn fetch_history(&self, limit: usize) -> StoreFuture<'_, Vec<Sample>> {
            self.inner.fetch_history(limit)
        }

        fn fetch_current(&self) -> StoreFuture<'_, Option<LiveReading>> {
            let read = self.reads.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                assert_eq!(read, 0, "store went away");
                Ok(Some(LiveReading::new(1.3, 0.0)))
            })
        }

        fn subscribe_current(&self, callback: LiveCallback) -> Subscription {
            self.inner.subscribe_current(callback)
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn outcome(heights: &[f64]) -> LoadOutcome {
        let samples = heights
            .iter()
            .enumerate()
            .map(|(i, &h)| Sample::new(i as i64 * 3_600_000, h, 0.0))
            .collect();
        LoadOutcome {
            window: Window::from_records(Granularity::Daily, samples),
            source: WindowSource::Store,
            diagnostic: None,
        }
    }

    #[test]
    fn test_status_response_serializes() {
        let resp = StatusResponse {
            version: "0.1.0".to_string(),
            build_date: "2026-01-01".to_string(),
            store: "memory".to_string(),
            live_available: false,
            recording: false,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"version\":\"0.1.0\""));
        assert!(json.contains("\"store\":\"memory\""));
    }

    #[test]
    fn test_analysis_response_daily_height() {
        let live = LiveReading::new(1.1, 0.0);
        let resp = AnalysisResponse::build(&outcome(&[1.0, 1.1]), live, Series::Height, utc());

        assert_eq!(resp.sample_count, 2);
        assert_eq!(resp.predictions.len(), 3);
        assert_eq!(resp.predictions[0].hours, 1);
        // Window rate is 0.1 m per hour
        assert_eq!(resp.predictions[0].height, 1.2);
        assert_eq!(resp.predictions[0].delta, 0.1);
        assert_eq!(resp.predictions[0].level, None);
        assert_eq!(resp.distribution.counts, vec![0, 0, 2, 0, 0, 0]);
        assert_eq!(resp.history_chart.datasets.len(), 2);
        assert!(resp.history_chart.is_aligned());
    }

    #[test]
    fn test_analysis_response_flags_danger() {
        let live = LiveReading::new(2.0, 0.0003);
        let resp = AnalysisResponse::build(&outcome(&[2.0]), live, Series::Height, utc());
        assert_eq!(resp.predictions[0].level, Some(AlertLevel::Danger));
        assert_eq!(resp.alerts.len(), 2);
    }

    #[test]
    fn test_analysis_response_serializes_lowercase_enums() {
        let resp = AnalysisResponse::build(
            &outcome(&[1.0]),
            LiveReading::default(),
            Series::Rate,
            utc(),
        );
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"range\":\"daily\""));
        assert!(json.contains("\"series\":\"rate\""));
        assert!(json.contains("\"source\":\"store\""));
    }

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or(None, Granularity::Weekly).unwrap(), Granularity::Weekly);
        assert_eq!(parse_or(Some(""), Series::Rate).unwrap(), Series::Rate);
        assert_eq!(
            parse_or(Some("monthly"), Granularity::Daily).unwrap(),
            Granularity::Monthly
        );
        let err = parse_or(Some("yearly"), Granularity::Daily).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_state_response_from_dashboard() {
        let state = DashboardState::new().reduce(Action::SelectRange(Granularity::Monthly));
        let resp = StateResponse::from(&state);
        assert!(resp.loading);
        assert_eq!(resp.generation, 1);
        assert_eq!(resp.range, Granularity::Monthly);
        assert_eq!(resp.sample_count, 0);
    }

    #[test]
    fn test_settings_patch_deserializes_partial() {
        let json = r#"{"theme": "dark"}"#;
        let patch: PreferencesPatch = serde_json::from_str(json).unwrap();
        assert!(patch.theme.is_some());
        assert_eq!(patch.refresh_interval_secs, None);
    }

    #[tokio::test]
    async fn test_retire_finished_recorder_returns_its_samples() {
        let store = Arc::new(CrashingStore {
            inner: MemoryStore::new(),
            reads: AtomicUsize::new(0),
        });
        let handle = Recorder::new(Duration::from_millis(100)).start(store);
        for _ in 0..100 {
            if !handle.is_alive() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!handle.is_alive());

        let mut slot = Some(handle);
        let discarded = retire_finished(&mut slot).unwrap().unwrap();
        assert!(slot.is_none());
        assert_eq!(discarded.samples.len(), 1);
        assert_eq!(discarded.samples[0].height, 1.3);
    }

    #[tokio::test]
    async fn test_retire_rejects_running_recorder() {
        let store = MemoryStore::new();
        let mut slot = Some(Recorder::default().start(Arc::new(store)));
        let (status, _) = retire_finished(&mut slot).unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(slot.is_some());

        let mut empty = None;
        assert!(retire_finished(&mut empty).unwrap().is_none());
    }
}
