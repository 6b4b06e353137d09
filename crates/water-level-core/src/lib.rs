//! Water Level Core - Samples, realtime store access, statistics and forecasting
//!
//! This library provides everything the dashboard computes: loading a bounded
//! window of water-level samples from the hosted realtime database (or a
//! synthetic window when none is available), reducing it to summary
//! statistics and linear predictions, binning heights for the histogram,
//! formatting chart series and exporting CSV. The dashboard view itself is a
//! plain state snapshot driven by a reducer.

pub mod chart;
pub mod export;
pub mod gauge;
pub mod loader;
pub mod model;
pub mod recording;
pub mod state;
pub mod stats;
pub mod store;

pub use loader::{LoadOutcome, WindowLoader, WindowSource};
pub use model::{Granularity, LiveReading, Sample, Window};
pub use recording::{Recorder, RecorderHandle, Recording};
pub use state::{Action, DashboardState, Preferences, Tab};
pub use stats::distribution::DistributionBins;
pub use stats::engine::{Alert, AlertLevel, Predictions, Statistics};
pub use store::{RealtimeStore, StoreError, Subscription};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date stamped by build.rs
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Instrument maximum height in meters
pub const MAX_HEIGHT_M: f64 = 3.0;

/// One-hour prediction above this height raises a warning (meters)
pub const WARNING_THRESHOLD_M: f64 = 2.4;

/// One-hour prediction above this height raises a danger alert (meters)
pub const DANGER_THRESHOLD_M: f64 = 2.7;

/// Database path of the live reading
pub const LIVE_PATH: &str = "water_level";

/// Database path of the history collection
pub const HISTORY_PATH: &str = "water_level_history";
