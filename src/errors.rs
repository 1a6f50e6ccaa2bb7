use thiserror::Error;

use crate::types::SourceId;

/// Failure of a single feed fetch. Every variant names the feed it came from.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("feed '{source}' is unreachable: {reason}")]
    Unreachable { source: SourceId, reason: String },
    #[error("feed '{source}' returned an undecodable payload: {reason}")]
    Decode { source: SourceId, reason: String },
    #[error("feed '{source}' timed out after {waited_ms}ms")]
    Timeout { source: SourceId, waited_ms: u64 },
}

impl FetchError {
    /// The feed this failure originated from
    pub fn source_id(&self) -> &SourceId {
        match self {
            FetchError::Unreachable { source, .. }
            | FetchError::Decode { source, .. }
            | FetchError::Timeout { source, .. } => source,
        }
    }
}

/// Failure of a whole aggregation run.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// A fail-fast strategy aborted on the first failing feed.
    #[error(transparent)]
    Source(#[from] FetchError),
    /// A wait-for-all strategy drained every feed and found failures.
    #[error("{} of {} feed fetches failed", .failures.len(), .attempted)]
    Sources {
        attempted: usize,
        failures: Vec<FetchError>,
    },
    /// A spawned fetch task died before producing an outcome.
    #[error("fetch worker failed: {0}")]
    Worker(String),
}

impl AggregateError {
    /// Every feed that failed in this run, in registry order.
    pub fn failed_sources(&self) -> Vec<&SourceId> {
        match self {
            AggregateError::Source(e) => vec![e.source_id()],
            AggregateError::Sources { failures, .. } => {
                failures.iter().map(FetchError::source_id).collect()
            }
            AggregateError::Worker(_) => Vec::new(),
        }
    }
}
