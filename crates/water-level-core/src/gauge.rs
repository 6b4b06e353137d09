//! Live gauge classification
//!
//! The gauge shows the live height as a percentage of the instrument maximum
//! and colors it by band.

use crate::MAX_HEIGHT_M;
use serde::Serialize;

/// Percentage above which the gauge shows the alert band
pub const ALERT_PERCENT: f64 = 60.0;

/// Percentage above which the gauge shows the danger band
pub const DANGER_PERCENT: f64 = 80.0;

/// Gauge color band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeStatus {
    Safe,
    Alert,
    Danger,
}

impl GaugeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Alert => "alert",
            Self::Danger => "danger",
        }
    }

    /// Status line shown under the gauge
    pub fn message(self) -> &'static str {
        match self {
            Self::Safe => "Kondisi aman. Ketinggian air normal",
            Self::Alert => "Waspada! Ketinggian air meningkat",
            Self::Danger => "Peringatan! Ketinggian air mencapai level bahaya",
        }
    }
}

/// Live height expressed for the gauge
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeReading {
    pub height: f64,
    /// Share of the instrument maximum, 0 to 100
    pub percent: f64,
    pub status: GaugeStatus,
}

impl GaugeReading {
    pub fn from_height(height: f64) -> Self {
        let percent = (height / MAX_HEIGHT_M * 100.0).clamp(0.0, 100.0);
        let status = if percent > DANGER_PERCENT {
            GaugeStatus::Danger
        } else if percent > ALERT_PERCENT {
            GaugeStatus::Alert
        } else {
            GaugeStatus::Safe
        };
        Self {
            height,
            percent,
            status,
        }
    }
}
