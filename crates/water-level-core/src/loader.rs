//! Window loader
//!
//! Fetches the most recent history for a granularity and turns it into a
//! [`Window`]. When the store has no history, or the query fails, a synthetic
//! window around the live reading is generated instead: loading never fails,
//! it only attaches a diagnostic for the banner.

use crate::model::{Granularity, LiveReading, Sample, Window};
use crate::store::{RealtimeStore, StoreError};
use crate::MAX_HEIGHT_M;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

/// Where the samples of a window came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowSource {
    Store,
    Synthetic,
}

/// Result of a load: always a usable window
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub window: Window,
    pub source: WindowSource,
    /// Description of the fetch failure, if there was one
    pub diagnostic: Option<String>,
}

/// Loads windows from a realtime store
pub struct WindowLoader<'a> {
    store: &'a dyn RealtimeStore,
}

impl<'a> WindowLoader<'a> {
    pub fn new(store: &'a dyn RealtimeStore) -> Self {
        Self { store }
    }

    /// Load a window ending now
    ///
    /// `live` seeds the synthetic fallback; defaults apply when it is `None`.
    pub async fn load(&self, granularity: Granularity, live: Option<LiveReading>) -> LoadOutcome {
        let result = self.store.fetch_history(granularity.record_limit()).await;
        let now_ms = Utc::now().timestamp_millis();
        resolve(result, granularity, live, now_ms, &mut rand::rng())
    }

    /// Load with an explicit clock and random source
    pub async fn load_at<R: Rng + Send>(
        &self,
        granularity: Granularity,
        live: Option<LiveReading>,
        now_ms: i64,
        rng: &mut R,
    ) -> LoadOutcome {
        let result = self.store.fetch_history(granularity.record_limit()).await;
        resolve(result, granularity, live, now_ms, rng)
    }
}

fn resolve<R: Rng>(
    result: Result<Vec<Sample>, StoreError>,
    granularity: Granularity,
    live: Option<LiveReading>,
    now_ms: i64,
    rng: &mut R,
) -> LoadOutcome {
    match result {
        Ok(records) if !records.is_empty() => {
            let window = Window::from_records(granularity, records);
            tracing::debug!(%granularity, samples = window.len(), "Loaded history window");
            LoadOutcome {
                window,
                source: WindowSource::Store,
                diagnostic: None,
            }
        }
        Ok(_) => {
            tracing::info!(%granularity, "No history available, using synthetic window");
            LoadOutcome {
                window: synthetic_window(granularity, live, now_ms, rng),
                source: WindowSource::Synthetic,
                diagnostic: None,
            }
        }
        Err(e) => {
            tracing::warn!(%granularity, error = %e, "History fetch failed, using synthetic window");
            LoadOutcome {
                window: synthetic_window(granularity, live, now_ms, rng),
                source: WindowSource::Synthetic,
                diagnostic: Some(e.user_message()),
            }
        }
    }
}

fn synthetic_window<R: Rng>(
    granularity: Granularity,
    live: Option<LiveReading>,
    now_ms: i64,
    rng: &mut R,
) -> Window {
    let samples = synthesize(granularity, LiveReading::or_default(live), now_ms, rng);
    Window::from_records(granularity, samples)
}

/// Generate evenly spaced samples around `live`, the last one at `now_ms`
///
/// Heights vary by up to ±0.1 m and are clamped to the instrument range;
/// rates vary by up to ±0.001 m/s.
pub fn synthesize<R: Rng>(
    granularity: Granularity,
    live: LiveReading,
    now_ms: i64,
    rng: &mut R,
) -> Vec<Sample> {
    let plan = granularity.synthetic_plan();
    (0..plan.samples)
        .map(|i| {
            let steps_back = (plan.samples - 1 - i) as i64;
            let height = (live.height + rng.random_range(-0.1..0.1)).clamp(0.0, MAX_HEIGHT_M);
            let rate = live.rate + rng.random_range(-0.001..0.001);
            Sample::new(now_ms - steps_back * plan.interval_ms, height, rate)
        })
        .collect()
}
