//! Periodic recording of the live reading
//!
//! A recorder polls the store's live reading on a fixed interval and
//! accumulates one sample per poll until stopped. The poll runs as a Tokio
//! task owned by the [`RecorderHandle`]; stopping or dropping the handle
//! cancels it.

use super::buffer::RecordingBuffer;
use crate::export;
use crate::model::Sample;
use crate::store::RealtimeStore;
use chrono::{FixedOffset, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default polling interval
pub const DEFAULT_RECORDING_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for a recording session
#[derive(Debug, Clone)]
pub struct Recorder {
    interval: Duration,
    max_samples: Option<usize>,
}

impl Recorder {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(100)),
            max_samples: None,
        }
    }

    /// Cap the number of samples kept (oldest evicted first)
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    /// Spawn the polling task. Must be called within a Tokio runtime.
    pub fn start(self, store: Arc<dyn RealtimeStore>) -> RecorderHandle {
        let buffer = Arc::new(Mutex::new(match self.max_samples {
            Some(n) => RecordingBuffer::with_max_size(n),
            None => RecordingBuffer::new(),
        }));
        let failed_polls = Arc::new(AtomicU64::new(0));

        let task_buffer = Arc::clone(&buffer);
        let task_failures = Arc::clone(&failed_polls);
        let interval = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match store.fetch_current().await {
                    Ok(Some(reading)) => {
                        let sample = Sample::new(
                            Utc::now().timestamp_millis(),
                            reading.height,
                            reading.rate,
                        );
                        lock_buffer(&task_buffer).push(sample);
                    }
                    Ok(None) => tracing::debug!("No live reading to record"),
                    Err(e) => {
                        task_failures.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(error = %e, "Recording poll failed");
                    }
                }
            }
        });

        let started_at_ms = Utc::now().timestamp_millis();
        tracing::info!(?interval, started_at_ms, "Recording started");

        RecorderHandle {
            started_at_ms,
            buffer,
            failed_polls,
            task: Some(task),
        }
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(DEFAULT_RECORDING_INTERVAL)
    }
}

/// Handle to a running recording
pub struct RecorderHandle {
    started_at_ms: i64,
    buffer: Arc<Mutex<RecordingBuffer>>,
    failed_polls: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl RecorderHandle {
    /// Cancel polling and return everything recorded so far
    pub fn stop(mut self) -> Recording {
        self.cancel();
        let samples = lock_buffer(&self.buffer).take();
        let recording = Recording {
            started_at_ms: self.started_at_ms,
            stopped_at_ms: Utc::now().timestamp_millis(),
            samples,
        };
        tracing::info!(
            samples = recording.samples.len(),
            failed_polls = self.failed_polls(),
            "Recording stopped"
        );
        recording
    }

    /// True while the polling task is running
    pub fn is_alive(&self) -> bool {
        self.task
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }

    pub fn started_at_ms(&self) -> i64 {
        self.started_at_ms
    }

    /// Samples recorded so far
    pub fn samples_recorded(&self) -> usize {
        lock_buffer(&self.buffer).len()
    }

    /// Polls that failed to reach the store
    pub fn failed_polls(&self) -> u64 {
        self.failed_polls.load(Ordering::Relaxed)
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// A panic while holding the lock leaves the samples intact
fn lock_buffer(buffer: &Mutex<RecordingBuffer>) -> MutexGuard<'_, RecordingBuffer> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Drop for RecorderHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A finished recording
#[derive(Debug, Clone)]
pub struct Recording {
    pub started_at_ms: i64,
    pub stopped_at_ms: i64,
    pub samples: Vec<Sample>,
}

impl Recording {
    pub fn to_csv(&self, offset: FixedOffset) -> String {
        export::to_csv(&self.samples, offset)
    }

    pub fn filename(&self) -> String {
        export::recording_filename(self.started_at_ms)
    }
}
