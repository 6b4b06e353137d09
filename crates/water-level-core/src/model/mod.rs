//! Data model: samples, live readings, granularity and windows

pub mod granularity;
pub mod sample;
pub mod window;

pub use granularity::{Granularity, SyntheticPlan};
pub use sample::{LiveReading, Sample};
pub use window::Window;
