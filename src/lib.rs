//! Water Level - river water-level monitoring dashboard
//!
//! This library re-exports the sample model, realtime store access,
//! statistics, chart formatting and export functionality from
//! `water-level-core`, plus the persistent application configuration.
//!
//! The web dashboard lives in `water-level-server`.

pub mod config;

pub use water_level_core::{chart, export, gauge, loader, model, recording, state, stats, store};

pub use water_level_core::{
    Action, Alert, AlertLevel, DashboardState, DistributionBins, Granularity, LiveReading,
    LoadOutcome, Predictions, RealtimeStore, Recorder, RecorderHandle, Recording, Sample,
    Statistics, StoreError, Subscription, Window, WindowLoader, WindowSource,
};
pub use water_level_core::{DANGER_THRESHOLD_M, MAX_HEIGHT_M, VERSION, WARNING_THRESHOLD_M};
