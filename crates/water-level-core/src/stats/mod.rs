//! Statistics engine and height distribution

pub mod distribution;
pub mod engine;

pub use distribution::{bin, DistributionBins};
pub use engine::{compute, Alert, AlertLevel, Predictions, RoundedStatistics, Statistics};
