//! Bounded sample buffer for recordings
//!
//! Keeps the most recent samples; the oldest are discarded once the buffer
//! is full.

use crate::model::Sample;
use std::collections::VecDeque;

/// Maximum number of recorded samples
const MAX_RECORDING_SIZE: usize = 17_280; // 24 hours at one poll per 5 s

/// Recorded samples in arrival order
#[derive(Debug)]
pub struct RecordingBuffer {
    samples: VecDeque<Sample>,
    max_size: usize,
    /// Samples discarded because the buffer was full
    dropped: u64,
}

impl RecordingBuffer {
    pub fn new() -> Self {
        Self::with_max_size(MAX_RECORDING_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            samples: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            dropped: 0,
        }
    }

    /// Append a sample, evicting the oldest when full
    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() >= self.max_size {
            self.samples.pop_front();
            self.dropped += 1;
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn samples(&self) -> &VecDeque<Sample> {
        &self.samples
    }

    /// Move all samples out, leaving the buffer empty
    pub fn take(&mut self) -> Vec<Sample> {
        self.samples.drain(..).collect()
    }
}

impl Default for RecordingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
