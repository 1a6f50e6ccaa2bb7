use serde::{Deserialize, Serialize};

/// Default per-fetch timeout applied by the HTTP feed clients, in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// A single vehicle listing as supplied by a feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
}

/// Opaque address of one listing feed. Built once at startup and shared
/// read-only by every strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// How feed fetches are issued and joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    Parallel,
    SequentialAsync,
    ConcurrentBlocking,
    Concurrent,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Sequential,
        Strategy::Parallel,
        Strategy::SequentialAsync,
        Strategy::ConcurrentBlocking,
        Strategy::Concurrent,
    ];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Parallel => write!(f, "parallel"),
            Strategy::SequentialAsync => write!(f, "sequential-async"),
            Strategy::ConcurrentBlocking => write!(f, "concurrent-blocking"),
            Strategy::Concurrent => write!(f, "concurrent"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sources: Vec<SourceId>,
    pub strategy: Strategy,
    pub fetch_timeout_secs: u64,
    pub compare: bool,
}
