//! Client-side recording of the live reading

pub mod buffer;
pub mod recorder;

pub use buffer::RecordingBuffer;
pub use recorder::{Recorder, RecorderHandle, Recording, DEFAULT_RECORDING_INTERVAL};
