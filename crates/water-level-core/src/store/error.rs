//! Store error types

use crate::HISTORY_PATH;

/// Errors returned by realtime store queries
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Network or transport failure
    #[error("request to realtime database failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status other than a missing index
    #[error("realtime database returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The ordered query was rejected because no index exists on `timestamp`
    #[error("ordered query on '/{path}' rejected: {message}")]
    MissingIndex { path: String, message: String },

    /// Response body was not the expected JSON
    #[error("invalid response from realtime database: {0}")]
    Decode(#[from] serde_json::Error),

    /// Backend is unreachable or refused the request
    #[error("realtime database unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_missing_index(&self) -> bool {
        matches!(self, Self::MissingIndex { .. })
    }

    /// Banner text shown to the user when a fetch fails
    pub fn user_message(&self) -> String {
        let mut message = format!("Failed to load analytics data: {self}");
        if self.is_missing_index() {
            message.push_str(&format!(
                ". Add \".indexOn\": \"timestamp\" to the database rules for path \"/{HISTORY_PATH}\""
            ));
        }
        message
    }
}
