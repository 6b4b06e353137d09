//! In-process store for offline runs and tests

use super::{LiveCallback, RealtimeStore, StoreError, StoreFuture, Subscription};
use crate::model::{LiveReading, Sample};
use crate::HISTORY_PATH;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Realtime store backed by memory
///
/// Clones share the same data. Failure modes can be switched on to exercise
/// the fallback paths of the window loader.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    history: Mutex<Vec<Sample>>,
    failure: Mutex<Option<Failure>>,
    live: watch::Sender<Option<LiveReading>>,
}

#[derive(Debug, Clone)]
enum Failure {
    Unavailable(String),
    MissingIndex,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (live, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                history: Mutex::new(Vec::new()),
                failure: Mutex::new(None),
                live,
            }),
        }
    }

    /// Store pre-populated with history records
    pub fn with_history(history: Vec<Sample>) -> Self {
        let store = Self::new();
        if let Ok(mut h) = store.inner.history.lock() {
            *h = history;
        }
        store
    }

    /// Append one history record
    pub fn push_history(&self, sample: Sample) {
        if let Ok(mut h) = self.inner.history.lock() {
            h.push(sample);
        }
    }

    /// Publish a new live reading to subscribers
    pub fn set_current(&self, reading: LiveReading) {
        self.inner.live.send_replace(Some(reading));
    }

    /// Make history queries fail with the given message (`None` clears it)
    pub fn fail_history(&self, message: Option<&str>) {
        if let Ok(mut f) = self.inner.failure.lock() {
            *f = message.map(|m| Failure::Unavailable(m.to_string()));
        }
    }

    /// Make history queries fail as if the timestamp index were missing
    pub fn reject_ordered_queries(&self) {
        if let Ok(mut f) = self.inner.failure.lock() {
            *f = Some(Failure::MissingIndex);
        }
    }

    fn history(&self, limit: usize) -> Result<Vec<Sample>, StoreError> {
        let failure = self.inner.failure.lock().ok().and_then(|f| f.clone());
        match failure {
            Some(Failure::Unavailable(message)) => return Err(StoreError::Unavailable(message)),
            Some(Failure::MissingIndex) => {
                return Err(StoreError::MissingIndex {
                    path: HISTORY_PATH.to_string(),
                    message: "Index not defined, add \".indexOn\": \"timestamp\"".to_string(),
                })
            }
            None => {}
        }

        let mut records = self
            .inner
            .history
            .lock()
            .map(|h| h.clone())
            .map_err(|_| StoreError::Unavailable("history lock poisoned".to_string()))?;
        records.sort_by_key(|s| s.timestamp);
        if records.len() > limit {
            records.drain(..records.len() - limit);
        }
        // Keyed maps come back in key order, not time order
        records.reverse();
        Ok(records)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn fetch_history(&self, limit: usize) -> StoreFuture<'_, Vec<Sample>> {
        let result = self.history(limit);
        Box::pin(async move { result })
    }

    fn fetch_current(&self) -> StoreFuture<'_, Option<LiveReading>> {
        let reading = *self.inner.live.borrow();
        Box::pin(async move { Ok(reading) })
    }

    fn subscribe_current(&self, callback: LiveCallback) -> Subscription {
        let mut rx = self.inner.live.subscribe();
        let task = tokio::spawn(async move {
            let initial = *rx.borrow_and_update();
            if let Some(reading) = initial {
                callback(reading);
            }
            while rx.changed().await.is_ok() {
                let reading = *rx.borrow_and_update();
                if let Some(reading) = reading {
                    callback(reading);
                }
            }
        });
        Subscription::new(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_history_limit_keeps_latest() {
        let store = MemoryStore::with_history((0..10).map(|i| Sample::new(i, 1.0, 0.0)).collect());
        let mut records = store.fetch_history(3).await.unwrap();
        records.sort_by_key(|s| s.timestamp);
        let ts: Vec<i64> = records.iter().map(|s| s.timestamp).collect();
        assert_eq!(ts, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let store = MemoryStore::new();
        store.fail_history(Some("offline"));
        assert!(matches!(
            store.fetch_history(24).await,
            Err(StoreError::Unavailable(_))
        ));

        store.reject_ordered_queries();
        assert!(store.fetch_history(24).await.unwrap_err().is_missing_index());

        store.fail_history(None);
        assert!(store.fetch_history(24).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_current_reading() {
        let store = MemoryStore::new();
        assert_eq!(store.fetch_current().await.unwrap(), None);
        store.set_current(LiveReading::new(2.1, 0.003));
        assert_eq!(
            store.fetch_current().await.unwrap(),
            Some(LiveReading::new(2.1, 0.003))
        );
    }

    #[tokio::test]
    async fn test_subscription_delivers_changes_until_dropped() {
        let store = MemoryStore::new();
        store.set_current(LiveReading::new(1.0, 0.0));

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let sub = store.subscribe_current(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1, "initial value delivered");

        store.set_current(LiveReading::new(1.1, 0.0));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        sub.unsubscribe();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        store.set_current(LiveReading::new(1.2, 0.0));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 2, "no delivery after unsubscribe");
    }
}
