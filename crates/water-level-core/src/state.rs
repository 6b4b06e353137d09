//! Dashboard view state and its reducer
//!
//! The whole view is a single [`DashboardState`] snapshot. Every change goes
//! through [`DashboardState::reduce`], which is pure: it takes the snapshot
//! and an [`Action`] and returns the next snapshot.
//!
//! Window fetches are tagged with the generation that was current when they
//! started. Selecting a range or refreshing bumps the generation, so a slow
//! response for an earlier selection arrives with a superseded tag and is
//! discarded instead of overwriting the newer window.

use crate::chart::{self, ChartData, Series};
use crate::loader::{LoadOutcome, WindowSource};
use crate::model::{Granularity, LiveReading, Window};
use crate::stats::engine::{self, Statistics};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Allowed auto-refresh intervals in seconds
pub const REFRESH_INTERVALS_SECS: [u32; 4] = [5, 10, 30, 60];

/// Top-level navigation tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Analysis,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Dashboard, Tab::Analysis, Tab::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Analysis => "analysis",
            Tab::Settings => "settings",
        }
    }

    /// Page route serving the tab
    pub fn path(self) -> &'static str {
        match self {
            Tab::Dashboard => "/",
            Tab::Analysis => "/analysis",
            Tab::Settings => "/settings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Analysis => "Analisis",
            Tab::Settings => "Pengaturan",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized tab name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab '{0}'")]
pub struct ParseTabError(pub String);

impl FromStr for Tab {
    type Err = ParseTabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTabError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Gauge colour thresholds in percent of the instrument range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeThresholds {
    pub normal: u8,
    pub warning: u8,
    pub danger: u8,
}

impl Default for GaugeThresholds {
    fn default() -> Self {
        Self {
            normal: 60,
            warning: 80,
            danger: 90,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Admin Water Level".to_string(),
            email: "admin@waterlevel.com".to_string(),
            phone: "+6281234567890".to_string(),
        }
    }
}

/// Settings-page preferences
///
/// Held in memory for the lifetime of the dashboard only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub refresh_interval_secs: u32,
    pub theme: Theme,
    pub location: String,
    pub thresholds: GaugeThresholds,
    pub notifications: NotificationPrefs,
    pub profile: Profile,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            theme: Theme::default(),
            location: "Sungai Ciliwung, Jakarta".to_string(),
            thresholds: GaugeThresholds::default(),
            notifications: NotificationPrefs::default(),
            profile: Profile::default(),
        }
    }
}

/// Rejected preference values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreferencesError {
    #[error("refresh interval must be one of 5, 10, 30 or 60 seconds (got {0})")]
    RefreshInterval(u32),

    #[error("thresholds must satisfy normal < warning < danger <= 100 (got {normal}/{warning}/{danger})")]
    Thresholds { normal: u8, warning: u8, danger: u8 },

    #[error("location must not be empty")]
    EmptyLocation,
}

impl Preferences {
    pub fn validate(&self) -> Result<(), PreferencesError> {
        if !REFRESH_INTERVALS_SECS.contains(&self.refresh_interval_secs) {
            return Err(PreferencesError::RefreshInterval(self.refresh_interval_secs));
        }
        let GaugeThresholds {
            normal,
            warning,
            danger,
        } = self.thresholds;
        if !(normal < warning && warning < danger && danger <= 100) {
            return Err(PreferencesError::Thresholds {
                normal,
                warning,
                danger,
            });
        }
        if self.location.trim().is_empty() {
            return Err(PreferencesError::EmptyLocation);
        }
        Ok(())
    }
}

/// Partial update of [`Preferences`]; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesPatch {
    pub refresh_interval_secs: Option<u32>,
    pub theme: Option<Theme>,
    pub location: Option<String>,
    pub thresholds: Option<GaugeThresholds>,
    pub notifications: Option<NotificationPrefs>,
    pub profile: Option<Profile>,
}

impl PreferencesPatch {
    /// Apply to `base`, returning the validated result
    pub fn apply(self, base: &Preferences) -> Result<Preferences, PreferencesError> {
        let mut next = base.clone();
        if let Some(v) = self.refresh_interval_secs {
            next.refresh_interval_secs = v;
        }
        if let Some(v) = self.theme {
            next.theme = v;
        }
        if let Some(v) = self.location {
            next.location = v;
        }
        if let Some(v) = self.thresholds {
            next.thresholds = v;
        }
        if let Some(v) = self.notifications {
            next.notifications = v;
        }
        if let Some(v) = self.profile {
            next.profile = v;
        }
        next.validate()?;
        Ok(next)
    }
}

/// Everything that can change the dashboard
#[derive(Debug, Clone)]
pub enum Action {
    SelectTab(Tab),
    /// Switch granularity; starts a new fetch generation
    SelectRange(Granularity),
    SelectSeries(Series),
    /// Re-fetch the current range; starts a new fetch generation
    Refresh,
    /// A fetch finished; ignored unless `generation` is still current
    WindowLoaded {
        generation: u64,
        outcome: LoadOutcome,
    },
    LiveUpdated(LiveReading),
    DismissDiagnostic,
    UpdatePreferences(Preferences),
}

/// Snapshot of the dashboard view
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub tab: Tab,
    pub range: Granularity,
    pub series: Series,
    /// True between the start of a fetch and its matching `WindowLoaded`
    pub loading: bool,
    pub generation: u64,
    pub window: Arc<Window>,
    pub source: Option<WindowSource>,
    pub live: Option<LiveReading>,
    pub statistics: Statistics,
    /// Dismissible banner text for the last fetch failure
    pub diagnostic: Option<String>,
    pub preferences: Preferences,
}

impl DashboardState {
    pub fn new() -> Self {
        let mut state = Self::default();
        state.statistics = engine::compute(&[], LiveReading::or_default(None));
        state
    }

    /// Next snapshot after `action`
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::SelectTab(tab) => self.tab = tab,
            Action::SelectRange(range) => {
                if range != self.range {
                    self.range = range;
                    self.begin_fetch();
                }
            }
            Action::SelectSeries(series) => self.series = series,
            Action::Refresh => self.begin_fetch(),
            Action::WindowLoaded {
                generation,
                outcome,
            } => {
                if generation != self.generation {
                    tracing::debug!(
                        generation,
                        current = self.generation,
                        "Discarding stale window"
                    );
                    return self;
                }
                self.window = Arc::new(outcome.window);
                self.source = Some(outcome.source);
                self.diagnostic = outcome.diagnostic;
                self.loading = false;
                self.recompute();
            }
            Action::LiveUpdated(reading) => {
                self.live = Some(reading);
                self.recompute();
            }
            Action::DismissDiagnostic => self.diagnostic = None,
            Action::UpdatePreferences(preferences) => match preferences.validate() {
                Ok(()) => self.preferences = preferences,
                Err(e) => tracing::warn!(error = %e, "Ignoring invalid preferences"),
            },
        }
        self
    }

    /// Apply `action` in place
    pub fn dispatch(&mut self, action: Action) {
        *self = std::mem::take(self).reduce(action);
    }

    /// Live reading, or the defaults when none has arrived
    pub fn live_or_default(&self) -> LiveReading {
        LiveReading::or_default(self.live)
    }

    /// History chart for the selected series
    pub fn history_chart(&self, offset: FixedOffset) -> ChartData {
        chart::format_history(&self.window, &self.statistics.predictions, self.series, offset)
    }

    fn begin_fetch(&mut self) {
        self.generation += 1;
        self.loading = true;
    }

    fn recompute(&mut self) {
        self.statistics = engine::compute(self.window.samples(), self.live_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sample;
    use approx::assert_relative_eq;

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
    fn test_new_state_has_defaults() {
        let state = DashboardState::new();
        assert_eq!(state.tab, Tab::Dashboard);
        assert_eq!(state.range, Granularity::Daily);
        assert_eq!(state.series, Series::Height);
        assert_eq!(state.generation, 0);
        assert!(!state.loading);
        assert_relative_eq!(state.statistics.predictions.one_hour, 1.5 + 0.001 * 3600.0);
    }

    #[test]
    fn test_select_range_starts_fetch() {
        let state = DashboardState::new().reduce(Action::SelectRange(Granularity::Weekly));
        assert_eq!(state.range, Granularity::Weekly);
        assert_eq!(state.generation, 1);
        assert!(state.loading);
    }

    #[test]
    fn test_same_range_is_noop() {
        let state = DashboardState::new().reduce(Action::SelectRange(Granularity::Daily));
        assert_eq!(state.generation, 0);
        assert!(!state.loading);
    }

    #[test]
    fn test_window_loaded_applies_current_generation() {
        let state = DashboardState::new().reduce(Action::Refresh);
        let state = state.reduce(Action::WindowLoaded {
            generation: 1,
            outcome: outcome(&[1.0, 2.0]),
        });
        assert!(!state.loading);
        assert_eq!(state.window.len(), 2);
        assert_eq!(state.source, Some(WindowSource::Store));
        assert_relative_eq!(state.statistics.average, 1.5);
    }

    #[test]
    fn test_stale_window_discarded() {
        let state = DashboardState::new()
            .reduce(Action::SelectRange(Granularity::Weekly))
            .reduce(Action::SelectRange(Granularity::Monthly));
        assert_eq!(state.generation, 2);

        let after = state.clone().reduce(Action::WindowLoaded {
            generation: 1,
            outcome: outcome(&[2.0]),
        });
        assert!(after.loading);
        assert!(after.window.is_empty());
        assert_eq!(after.range, Granularity::Monthly);
    }

    #[test]
    fn test_live_update_recomputes_over_window() {
        let state = DashboardState::new().reduce(Action::Refresh).reduce(Action::WindowLoaded {
            generation: 1,
            outcome: outcome(&[1.0]),
        });
        let state = state.reduce(Action::LiveUpdated(LiveReading::new(1.0, 0.0002)));
        // Single sample: the live rate drives the projection
        assert_relative_eq!(state.statistics.predictions.one_hour, 1.0 + 0.0002 * 3600.0);
        assert_eq!(state.window.len(), 1);
    }

    #[test]
    fn test_dismiss_diagnostic() {
        let mut loaded = outcome(&[]);
        loaded.source = WindowSource::Synthetic;
        loaded.diagnostic = Some("Failed to load analytics data".to_string());
        let mut state = DashboardState::new();
        state.dispatch(Action::Refresh);
        state.dispatch(Action::WindowLoaded {
            generation: 1,
            outcome: loaded,
        });
        assert!(state.diagnostic.is_some());
        state.dispatch(Action::DismissDiagnostic);
        assert!(state.diagnostic.is_none());
    }

    #[test]
    fn test_invalid_preferences_ignored() {
        let prefs = Preferences {
            refresh_interval_secs: 7,
            ..Preferences::default()
        };
        let state = DashboardState::new().reduce(Action::UpdatePreferences(prefs));
        assert_eq!(state.preferences.refresh_interval_secs, 30);
    }

    #[test]
    fn test_patch_apply() {
        let patch = PreferencesPatch {
            theme: Some(Theme::Dark),
            refresh_interval_secs: Some(10),
            ..Default::default()
        };
        let next = patch.apply(&Preferences::default()).unwrap();
        assert_eq!(next.theme, Theme::Dark);
        assert_eq!(next.refresh_interval_secs, 10);
        assert_eq!(next.location, "Sungai Ciliwung, Jakarta");
    }

    #[test]
    fn test_patch_rejects_bad_thresholds() {
        let patch = PreferencesPatch {
            thresholds: Some(GaugeThresholds {
                normal: 80,
                warning: 60,
                danger: 90,
            }),
            ..Default::default()
        };
        assert!(matches!(
            patch.apply(&Preferences::default()),
            Err(PreferencesError::Thresholds { .. })
        ));
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!("Analysis".parse::<Tab>().unwrap(), Tab::Analysis);
        assert_eq!(Tab::Settings.path(), "/settings");
        assert!("charts".parse::<Tab>().is_err());
    }
}
