//! Firebase Realtime Database client over the REST API
//!
//! History is read with `orderBy="timestamp"&limitToLast=K`. The database
//! rejects that query with HTTP 400 unless the rules declare
//! `".indexOn": "timestamp"` for the history path, which is reported as
//! [`StoreError::MissingIndex`].
//!
//! The live subscription polls the live path and invokes the callback when
//! the value differs from the previous poll.

use super::{LiveCallback, RealtimeStore, StoreError, StoreFuture, Subscription};
use crate::model::{LiveReading, Sample};
use crate::{HISTORY_PATH, LIVE_PATH};
use serde_json::Value;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Default interval between live-reading polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Request timeout for one REST call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// REST client for one database instance
#[derive(Debug, Clone)]
pub struct FirebaseStore {
    client: reqwest::Client,
    base_url: String,
    auth: Option<String>,
    poll_interval: Duration,
}

impl FirebaseStore {
    /// Create a client for `https://<project>.firebaseio.com`-style URLs
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Attach a database secret or ID token as the `auth` parameter
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.auth = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(100));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// REST URL of a database path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, StoreError> {
        let mut request = self.client.get(self.url(path)).query(query);
        if let Some(ref auth) = self.auth {
            request = request.query(&[("auth", auth.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body);
            if message.contains("indexOn") {
                return Err(StoreError::MissingIndex {
                    path: path.to_string(),
                    message,
                });
            }
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn history(&self, limit: usize) -> Result<Vec<Sample>, StoreError> {
        let query = [
            ("orderBy", "\"timestamp\"".to_string()),
            ("limitToLast", limit.to_string()),
        ];
        let value = self.get_json(HISTORY_PATH, &query).await?;
        let samples = parse_history(value)?;
        tracing::debug!(limit, count = samples.len(), "Fetched history records");
        Ok(samples)
    }

    async fn current(&self) -> Result<Option<LiveReading>, StoreError> {
        let value = self.get_json(LIVE_PATH, &[]).await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

impl RealtimeStore for FirebaseStore {
    fn kind(&self) -> &'static str {
        "firebase"
    }

    fn fetch_history(&self, limit: usize) -> StoreFuture<'_, Vec<Sample>> {
        Box::pin(self.history(limit))
    }

    fn fetch_current(&self) -> StoreFuture<'_, Option<LiveReading>> {
        Box::pin(self.current())
    }

    fn subscribe_current(&self, callback: LiveCallback) -> Subscription {
        let store = self.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(store.poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<LiveReading> = None;

            loop {
                interval.tick().await;
                match store.current().await {
                    Ok(Some(reading)) if last != Some(reading) => {
                        last = Some(reading);
                        callback(reading);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "Live reading poll failed"),
                }
            }
        });
        tracing::info!(url = %self.url(LIVE_PATH), interval = ?self.poll_interval, "Subscribed to live reading");
        Subscription::new(task)
    }
}

/// Decode a history query result
///
/// The database answers with an object keyed by push id, an array when keys
/// are small integers, or `null` when the path is empty. Records that fail to
/// decode are skipped.
pub fn parse_history(value: Value) -> Result<Vec<Sample>, StoreError> {
    let records: Vec<Value> = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Array(items) => items.into_iter().filter(|v| !v.is_null()).collect(),
        other => {
            return Err(StoreError::Unavailable(format!(
                "unexpected history payload: {other}"
            )))
        }
    };

    let mut samples = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<Sample>(record) {
            Ok(sample) => samples.push(sample),
            Err(e) => tracing::warn!(error = %e, "Skipping malformed history record"),
        }
    }
    Ok(samples)
}

/// Extract the `error` field of a REST error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
