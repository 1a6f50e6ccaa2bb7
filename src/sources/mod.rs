pub mod demo;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::types::{Config, Listing, SourceId};

/// Capability to fetch the listings of one feed, in a blocking and a
/// suspending flavor against the same feed addresses.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch a feed, blocking the calling thread until it resolves.
    fn fetch_blocking(&self, source: &SourceId) -> Result<Vec<Listing>, FetchError>;

    /// Fetch a feed, suspending the calling task while the request is
    /// outstanding.
    async fn fetch(&self, source: &SourceId) -> Result<Vec<Listing>, FetchError>;
}

/// Production client: routes each feed address to the HTTP or the built-in
/// demo fetch path.
pub struct FeedClient {
    http: http::HttpFeed,
}

impl FeedClient {
    pub fn new(fetch_timeout_secs: u64) -> Self {
        Self {
            http: http::HttpFeed::new(fetch_timeout_secs),
        }
    }
}

#[async_trait]
impl ListingSource for FeedClient {
    fn fetch_blocking(&self, source: &SourceId) -> Result<Vec<Listing>, FetchError> {
        match demo::parse_feed_spec(source)? {
            Some(spec) => demo::serve_blocking(source, &spec),
            None => self.http.fetch_blocking(source),
        }
    }

    async fn fetch(&self, source: &SourceId) -> Result<Vec<Listing>, FetchError> {
        match demo::parse_feed_spec(source)? {
            Some(spec) => demo::serve(source, &spec).await,
            None => self.http.fetch(source).await,
        }
    }
}

pub fn create_client(config: &Config) -> Arc<dyn ListingSource> {
    Arc::new(FeedClient::new(config.fetch_timeout_secs))
}
