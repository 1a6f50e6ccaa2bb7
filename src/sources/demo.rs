use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use regex::Regex;
use tracing::debug;

use crate::errors::FetchError;
use crate::types::{Listing, SourceId};

const MAKES: &[(&str, &[&str])] = &[
    ("Toyota", &["Corolla", "Camry", "RAV4"]),
    ("Ford", &["Focus", "Fusion", "F-150"]),
    ("Honda", &["Civic", "Accord", "CR-V"]),
    ("BMW", &["320i", "530e", "X5"]),
    ("Audi", &["A4", "Q5", "e-tron"]),
];

/// Behavior of a built-in demo feed
#[derive(Debug, Clone, PartialEq)]
pub enum FeedSpec {
    /// Serve `count` generated listings around `base_price` after `delay_ms`
    Generate {
        count: usize,
        delay_ms: u64,
        base_price: f64,
    },
    /// Always fail with the given kind
    Fail(FailKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailKind {
    Unreachable,
    Decode,
    Timeout,
}

/// Recognize `demo(count,delay_ms,base_price)` and `fail(kind)` feed
/// addresses. Anything else is assumed to be a remote URL.
pub fn parse_feed_spec(source: &SourceId) -> Result<Option<FeedSpec>, FetchError> {
    let bad = |reason: String| FetchError::Unreachable {
        source: source.clone(),
        reason,
    };

    let demo_re =
        Regex::new(r"^demo\((\d+),(\d+),([0-9.]+)\)$").map_err(|e| bad(e.to_string()))?;
    let fail_re =
        Regex::new(r"^fail\((unreachable|decode|timeout)\)$").map_err(|e| bad(e.to_string()))?;

    if let Some(caps) = demo_re.captures(source.as_str()) {
        let count = caps[1]
            .parse()
            .map_err(|e| bad(format!("bad demo listing count: {}", e)))?;
        let delay_ms = caps[2]
            .parse()
            .map_err(|e| bad(format!("bad demo delay: {}", e)))?;
        let base_price = caps[3]
            .parse()
            .map_err(|e| bad(format!("bad demo base price: {}", e)))?;
        return Ok(Some(FeedSpec::Generate {
            count,
            delay_ms,
            base_price,
        }));
    }

    if let Some(caps) = fail_re.captures(source.as_str()) {
        let kind = match &caps[1] {
            "unreachable" => FailKind::Unreachable,
            "decode" => FailKind::Decode,
            "timeout" => FailKind::Timeout,
            other => return Err(bad(format!("unknown failure kind '{}'", other))),
        };
        return Ok(Some(FeedSpec::Fail(kind)));
    }

    Ok(None)
}

pub fn serve_blocking(source: &SourceId, spec: &FeedSpec) -> Result<Vec<Listing>, FetchError> {
    match spec {
        FeedSpec::Generate {
            count,
            delay_ms,
            base_price,
        } => {
            debug!("serving demo feed {} after {}ms", source, delay_ms);
            std::thread::sleep(Duration::from_millis(*delay_ms));
            Ok(generate_listings(*count, *base_price))
        }
        FeedSpec::Fail(kind) => Err(scripted_failure(source, *kind)),
    }
}

pub async fn serve(source: &SourceId, spec: &FeedSpec) -> Result<Vec<Listing>, FetchError> {
    match spec {
        FeedSpec::Generate {
            count,
            delay_ms,
            base_price,
        } => {
            debug!("serving demo feed {} after {}ms", source, delay_ms);
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
            Ok(generate_listings(*count, *base_price))
        }
        FeedSpec::Fail(kind) => Err(scripted_failure(source, *kind)),
    }
}

fn scripted_failure(source: &SourceId, kind: FailKind) -> FetchError {
    match kind {
        FailKind::Unreachable => FetchError::Unreachable {
            source: source.clone(),
            reason: "demo feed scripted as unreachable".to_string(),
        },
        FailKind::Decode => FetchError::Decode {
            source: source.clone(),
            reason: "demo feed scripted to serve an undecodable payload".to_string(),
        },
        FailKind::Timeout => FetchError::Timeout {
            source: source.clone(),
            waited_ms: 0,
        },
    }
}

fn generate_listings(count: usize, base_price: f64) -> Vec<Listing> {
    let mut rng = StdRng::from_entropy();
    let price_model = Normal::new(base_price, base_price * 0.08).unwrap();
    let id_base = rng.gen_range(1_000..9_000) as i64 * 1_000;

    (0..count)
        .map(|i| {
            let (make, models) = MAKES[rng.gen_range(0..MAKES.len())];
            let model = models[rng.gen_range(0..models.len())];
            let price = price_model.sample(&mut rng).max(base_price * 0.5);
            Listing {
                id: id_base + i as i64,
                make: make.to_string(),
                model: model.to_string(),
                year: rng.gen_range(2008..=2026),
                price: (price * 100.0).round() / 100.0,
            }
        })
        .collect()
}
