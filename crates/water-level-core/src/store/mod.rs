//! Realtime database access
//!
//! The dashboard depends only on the [`RealtimeStore`] trait: a one-shot
//! ordered history query, a one-shot read of the live reading, and a
//! subscription that invokes a callback whenever the live reading changes.
//! [`FirebaseStore`] talks to the hosted database over its REST API;
//! [`MemoryStore`] is an in-process fake used for offline runs and tests.

pub mod error;
pub mod firebase;
pub mod memory;

pub use error::StoreError;
pub use firebase::FirebaseStore;
pub use memory::MemoryStore;

use crate::model::{LiveReading, Sample};
use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;

/// Future returned by store queries
pub type StoreFuture<'a, T> = BoxFuture<'a, Result<T, StoreError>>;

/// Callback invoked with every new live reading
pub type LiveCallback = Box<dyn Fn(LiveReading) + Send + Sync + 'static>;

/// Hosted realtime key-value store holding the live reading and its history
pub trait RealtimeStore: Send + Sync {
    /// Short name of the backend for status reporting
    fn kind(&self) -> &'static str;

    /// Most recent `limit` history records ordered by timestamp
    ///
    /// Record order in the result is not guaranteed; callers sort.
    fn fetch_history(&self, limit: usize) -> StoreFuture<'_, Vec<Sample>>;

    /// Current live reading, `None` if the path holds no value
    fn fetch_current(&self) -> StoreFuture<'_, Option<LiveReading>>;

    /// Invoke `callback` with the current value and on every change
    ///
    /// Must be called from within a Tokio runtime. The returned
    /// [`Subscription`] cancels delivery when dropped.
    fn subscribe_current(&self, callback: LiveCallback) -> Subscription;
}

/// Handle to an active live-reading subscription
#[derive(Debug)]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// Stop receiving updates
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    /// True while the delivery task is running
    pub fn is_active(&self) -> bool {
        self.task
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Live subscription cancelled");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
