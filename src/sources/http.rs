use std::time::Duration;

use tracing::debug;

use crate::errors::FetchError;
use crate::types::{Listing, SourceId};

/// Fetches listing feeds over HTTP. The blocking and suspending clients share
/// the same timeout and the same payload decoding, so a given feed behaves
/// identically on both paths.
pub struct HttpFeed {
    agent: ureq::Agent,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFeed {
    pub fn new(fetch_timeout_secs: u64) -> Self {
        let timeout = Duration::from_secs(fetch_timeout_secs);
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap(),
            timeout,
        }
    }

    pub fn fetch_blocking(&self, source: &SourceId) -> Result<Vec<Listing>, FetchError> {
        check_scheme(source)?;
        debug!("GET {} (blocking)", source);

        let response = self
            .agent
            .get(source.as_str())
            .call()
            .map_err(|e| self.classify_ureq(source, e))?;
        let body = response.into_string().map_err(|e| FetchError::Unreachable {
            source: source.clone(),
            reason: format!("failed to read body: {}", e),
        })?;

        decode_payload(source, &body)
    }

    pub async fn fetch(&self, source: &SourceId) -> Result<Vec<Listing>, FetchError> {
        check_scheme(source)?;
        debug!("GET {} (suspending)", source);

        let response = self
            .client
            .get(source.as_str())
            .send()
            .await
            .map_err(|e| self.classify_reqwest(source, e))?
            .error_for_status()
            .map_err(|e| FetchError::Unreachable {
                source: source.clone(),
                reason: e.to_string(),
            })?;
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_reqwest(source, e))?;

        decode_payload(source, &body)
    }

    fn classify_ureq(&self, source: &SourceId, err: ureq::Error) -> FetchError {
        match err {
            ureq::Error::Status(code, _) => FetchError::Unreachable {
                source: source.clone(),
                reason: format!("status {}", code),
            },
            ureq::Error::Transport(transport) => {
                let timed_out = std::error::Error::source(&transport)
                    .and_then(|cause| cause.downcast_ref::<std::io::Error>())
                    .is_some_and(|io| {
                        matches!(
                            io.kind(),
                            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                        )
                    });
                if timed_out {
                    FetchError::Timeout {
                        source: source.clone(),
                        waited_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    FetchError::Unreachable {
                        source: source.clone(),
                        reason: transport.to_string(),
                    }
                }
            }
        }
    }

    fn classify_reqwest(&self, source: &SourceId, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                source: source.clone(),
                waited_ms: self.timeout.as_millis() as u64,
            }
        } else if err.is_decode() {
            FetchError::Decode {
                source: source.clone(),
                reason: err.to_string(),
            }
        } else {
            FetchError::Unreachable {
                source: source.clone(),
                reason: err.to_string(),
            }
        }
    }
}

fn check_scheme(source: &SourceId) -> Result<(), FetchError> {
    if source.as_str().starts_with("http://") || source.as_str().starts_with("https://") {
        Ok(())
    } else {
        Err(FetchError::Unreachable {
            source: source.clone(),
            reason: "unsupported feed address scheme".to_string(),
        })
    }
}

/// Decode a feed body as a JSON array of listings
fn decode_payload(source: &SourceId, body: &str) -> Result<Vec<Listing>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode {
        source: source.clone(),
        reason: e.to_string(),
    })
}
