//! Time-range granularity selector
//!
//! Controls how many history records are requested from the store and how a
//! synthetic window is laid out when no history is available.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HOUR_MS: i64 = 3600 * 1000;

/// Daily / weekly / monthly range selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Layout of a synthetic window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticPlan {
    /// Number of samples to generate
    pub samples: usize,
    /// Spacing between samples in milliseconds
    pub interval_ms: i64,
}

/// Error for an unrecognized granularity name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown range '{0}' (expected daily, weekly or monthly)")]
pub struct ParseGranularityError(pub String);

impl Granularity {
    pub const ALL: [Granularity; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    /// Maximum number of history records in a window of this granularity
    pub fn record_limit(self) -> usize {
        match self {
            Self::Daily => 24,
            Self::Weekly => 168,  // 24 * 7
            Self::Monthly => 720, // ~30 days of hourly data
        }
    }

    /// Synthetic layout used when the store has nothing to offer
    pub fn synthetic_plan(self) -> SyntheticPlan {
        match self {
            Self::Daily => SyntheticPlan {
                samples: 24,
                interval_ms: HOUR_MS,
            },
            Self::Weekly => SyntheticPlan {
                samples: 28, // 7 days * 4 samples per day
                interval_ms: 6 * HOUR_MS,
            },
            Self::Monthly => SyntheticPlan {
                samples: 30,
                interval_ms: 24 * HOUR_MS,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Label shown on the range selector
    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Harian",
            Self::Weekly => "Mingguan",
            Self::Monthly => "Bulanan",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(ParseGranularityError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_limits() {
        assert_eq!(Granularity::Daily.record_limit(), 24);
        assert_eq!(Granularity::Weekly.record_limit(), 168);
        assert_eq!(Granularity::Monthly.record_limit(), 720);
    }

    #[test]
    fn test_synthetic_plans() {
        assert_eq!(Granularity::Daily.synthetic_plan().samples, 24);
        assert_eq!(Granularity::Daily.synthetic_plan().interval_ms, 3_600_000);
        assert_eq!(Granularity::Weekly.synthetic_plan().samples, 28);
        assert_eq!(Granularity::Weekly.synthetic_plan().interval_ms, 21_600_000);
        assert_eq!(Granularity::Monthly.synthetic_plan().samples, 30);
        assert_eq!(Granularity::Monthly.synthetic_plan().interval_ms, 86_400_000);
    }

    #[test]
    fn test_parse_and_display() {
        for g in Granularity::ALL {
            assert_eq!(g.to_string().parse::<Granularity>().unwrap(), g);
        }
        assert_eq!("  Weekly ".parse::<Granularity>().unwrap(), Granularity::Weekly);
        assert!("hourly".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Granularity::Monthly).unwrap();
        assert_eq!(json, "\"monthly\"");
        let parsed: Granularity = serde_json::from_str("\"daily\"").unwrap();
        assert_eq!(parsed, Granularity::Daily);
    }
}
