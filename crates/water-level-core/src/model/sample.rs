//! Sample and live reading records
//!
//! Both mirror the JSON shapes stored in the realtime database:
//! `water_level_history/<id>` holds `{timestamp, height, rate}` and
//! `water_level` holds `{height, rate}`.

use serde::{Deserialize, Deserializer, Serialize};

/// Height used when no live reading is available (meters)
pub const DEFAULT_HEIGHT_M: f64 = 1.5;

/// Rate used when no live reading is available (meters/second)
pub const DEFAULT_RATE_M_S: f64 = 0.001;

/// A single water-level observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch
    #[serde(deserialize_with = "deserialize_millis")]
    pub timestamp: i64,
    /// Water height in meters
    #[serde(default)]
    pub height: f64,
    /// Instantaneous rate of change in meters/second
    #[serde(default)]
    pub rate: f64,
}

impl Sample {
    pub fn new(timestamp: i64, height: f64, rate: f64) -> Self {
        Self {
            timestamp,
            height,
            rate,
        }
    }
}

/// The current sensor reading pushed on the live path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveReading {
    /// Water height in meters
    #[serde(default)]
    pub height: f64,
    /// Rate of change in meters/second
    #[serde(default)]
    pub rate: f64,
}

impl LiveReading {
    pub fn new(height: f64, rate: f64) -> Self {
        Self { height, rate }
    }

    /// Resolve an optional reading to the defaults used by the dashboard
    pub fn or_default(reading: Option<LiveReading>) -> LiveReading {
        reading.unwrap_or_default()
    }
}

impl Default for LiveReading {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT_M,
            rate: DEFAULT_RATE_M_S,
        }
    }
}

/// Accept integer or floating point millisecond timestamps
fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|f| f as i64))
        .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
}
