use std::time::Duration;

/// Configuration could not be read or failed validation.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

/// Failures surfaced by a [`crate::storage::JobStore`].
///
/// Callers get these as-is; the fetcher never retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("query exceeded max time of {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("store query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("stored document is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("store connection is poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout(_))
    }
}
