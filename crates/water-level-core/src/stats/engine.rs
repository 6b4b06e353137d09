//! Statistics engine
//!
//! Reduces a window of samples to summary statistics, projects the water
//! height linearly over 1, 3 and 6 hours, and raises alerts when the
//! one-hour projection crosses the warning or danger thresholds.
//!
//! Everything here is pure: the same window and live reading always yield
//! the same [`Statistics`].

use crate::model::{LiveReading, Sample};
use crate::{DANGER_THRESHOLD_M, WARNING_THRESHOLD_M};
use serde::Serialize;

const HOUR_SECS: f64 = 3600.0;

/// Prediction horizons in hours
pub const HORIZONS_HOURS: [u32; 3] = [1, 3, 6];

/// Severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Danger,
}

impl AlertLevel {
    /// Highest level reached by a projected height, if any
    pub fn for_height(height: f64) -> Option<AlertLevel> {
        if height > DANGER_THRESHOLD_M {
            Some(Self::Danger)
        } else if height > WARNING_THRESHOLD_M {
            Some(Self::Warning)
        } else {
            None
        }
    }
}

/// One alert derived from the predictions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

/// Linear projections of the water height
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Predictions {
    pub one_hour: f64,
    pub three_hours: f64,
    pub six_hours: f64,
}

impl Predictions {
    /// Project `last_height` forward at `rate` meters/second
    pub fn project(last_height: f64, rate: f64) -> Self {
        Self {
            one_hour: last_height + rate * HOUR_SECS,
            three_hours: last_height + rate * HOUR_SECS * 3.0,
            six_hours: last_height + rate * HOUR_SECS * 6.0,
        }
    }

    /// Predictions paired with their horizon in hours
    pub fn by_horizon(&self) -> [(u32, f64); 3] {
        [
            (HORIZONS_HOURS[0], self.one_hour),
            (HORIZONS_HOURS[1], self.three_hours),
            (HORIZONS_HOURS[2], self.six_hours),
        ]
    }
}

/// Summary statistics of a window
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    /// Population standard deviation of heights
    pub standard_deviation: f64,
    /// Mean of consecutive pairwise rates, meters/second
    pub rate_of_change: f64,
    pub predictions: Predictions,
    pub alerts: Vec<Alert>,
    /// Number of samples the statistics were computed from
    pub sample_count: usize,
}

/// Statistics rounded for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundedStatistics {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub standard_deviation: f64,
    pub rate_of_change: f64,
    pub predictions: Predictions,
}

impl Statistics {
    /// Heights and predictions to 2 places, rate to 4 places
    ///
    /// Alerts are not re-evaluated: they were derived from unrounded values.
    pub fn rounded(&self) -> RoundedStatistics {
        RoundedStatistics {
            average: round_to(self.average, 2),
            max: round_to(self.max, 2),
            min: round_to(self.min, 2),
            standard_deviation: round_to(self.standard_deviation, 2),
            rate_of_change: round_to(self.rate_of_change, 4),
            predictions: Predictions {
                one_hour: round_to(self.predictions.one_hour, 2),
                three_hours: round_to(self.predictions.three_hours, 2),
                six_hours: round_to(self.predictions.six_hours, 2),
            },
        }
    }

    pub fn has_alert(&self, level: AlertLevel) -> bool {
        self.alerts.iter().any(|a| a.level == level)
    }
}

/// Compute statistics over `samples` (ascending by timestamp)
///
/// An empty window yields zeroed summary values and predictions projected
/// from the live reading. The projection starts from the last window height
/// and moves at the window's rate of change; either one that is zero (a flat
/// or single-sample window, a zero reading) is replaced by the live value.
pub fn compute(samples: &[Sample], live: LiveReading) -> Statistics {
    let rate_of_change = mean_pairwise_rate(samples);

    let last_height = nonzero_or(samples.last().map_or(0.0, |s| s.height), live.height);
    let projection_rate = nonzero_or(rate_of_change, live.rate);
    let predictions = Predictions::project(last_height, projection_rate);
    let alerts = alerts_for(&predictions);

    if samples.is_empty() {
        return Statistics {
            predictions,
            alerts,
            ..Default::default()
        };
    }

    let n = samples.len() as f64;
    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    for s in samples {
        sum += s.height;
        max = max.max(s.height);
        min = min.min(s.height);
    }
    let average = sum / n;
    let variance = samples
        .iter()
        .map(|s| {
            let diff = s.height - average;
            diff * diff
        })
        .sum::<f64>()
        / n;

    Statistics {
        average,
        max,
        min,
        standard_deviation: variance.sqrt(),
        rate_of_change,
        predictions,
        alerts,
        sample_count: samples.len(),
    }
}

/// `value` unless it is zero or NaN
fn nonzero_or(value: f64, fallback: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        fallback
    } else {
        value
    }
}

/// Mean of `(h[i] - h[i-1]) / dt_seconds` over consecutive pairs
///
/// Pairs with a non-positive time delta contribute nothing but still count
/// toward the `len - 1` divisor.
pub fn mean_pairwise_rate(samples: &[Sample]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    let total: f64 = samples
        .windows(2)
        .filter_map(|pair| {
            let dt = (pair[1].timestamp - pair[0].timestamp) as f64 / 1000.0;
            (dt > 0.0).then(|| (pair[1].height - pair[0].height) / dt)
        })
        .sum();

    total / (samples.len() - 1) as f64
}

/// Alerts raised by the one-hour prediction, warning before danger
pub fn alerts_for(predictions: &Predictions) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if predictions.one_hour > WARNING_THRESHOLD_M {
        alerts.push(Alert {
            level: AlertLevel::Warning,
            message: "Potensi ketinggian air mencapai level waspada dalam 1 jam".to_string(),
        });
    }
    if predictions.one_hour > DANGER_THRESHOLD_M {
        alerts.push(Alert {
            level: AlertLevel::Danger,
            message: "Potensi ketinggian air mencapai level bahaya dalam 1 jam".to_string(),
        });
    }
    alerts
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
