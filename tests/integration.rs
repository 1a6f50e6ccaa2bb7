use listing_factory::aggregation::{fetch_all_sequential, fetch_all_sequential_async, run_strategy};
use listing_factory::errors::{AggregateError, FetchError};
use listing_factory::sources::ListingSource;
use listing_factory::types::{Listing, SourceId, Strategy};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

const FEED_LATENCY_MS: u64 = 100;

/// Widen the rayon pool once so the worker-pool strategy can overlap all
/// latency fixtures regardless of the host's core count.
fn init_worker_pool() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = rayon::ThreadPoolBuilder::new().num_threads(8).build_global();
    });
}

struct Feed {
    listings: Vec<Listing>,
    delay: Duration,
    fail: Option<&'static str>,
    calls: AtomicUsize,
}

/// In-memory listing source with scripted per-feed behavior and invocation
/// counters, honoring its latency on both fetch paths.
struct ScriptedSource {
    feeds: HashMap<String, Feed>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            feeds: HashMap::new(),
        }
    }

    fn serving(self, name: &str, listings: Vec<Listing>) -> Self {
        self.with_feed(name, listings, Duration::ZERO, None)
    }

    fn serving_slow(self, name: &str, listings: Vec<Listing>, delay: Duration) -> Self {
        self.with_feed(name, listings, delay, None)
    }

    fn failing(self, name: &str, kind: &'static str) -> Self {
        self.with_feed(name, Vec::new(), Duration::ZERO, Some(kind))
    }

    fn with_feed(
        mut self,
        name: &str,
        listings: Vec<Listing>,
        delay: Duration,
        fail: Option<&'static str>,
    ) -> Self {
        self.feeds.insert(
            name.to_string(),
            Feed {
                listings,
                delay,
                fail,
                calls: AtomicUsize::new(0),
            },
        );
        self
    }

    fn calls(&self, name: &str) -> usize {
        self.feeds[name].calls.load(Ordering::SeqCst)
    }

    fn feed(&self, source: &SourceId) -> &Feed {
        let feed = self
            .feeds
            .get(source.as_str())
            .unwrap_or_else(|| panic!("unknown feed {}", source));
        feed.calls.fetch_add(1, Ordering::SeqCst);
        feed
    }

    fn outcome(feed: &Feed, source: &SourceId) -> Result<Vec<Listing>, FetchError> {
        match feed.fail {
            Some("unreachable") => Err(FetchError::Unreachable {
                source: source.clone(),
                reason: "scripted".to_string(),
            }),
            Some("decode") => Err(FetchError::Decode {
                source: source.clone(),
                reason: "scripted".to_string(),
            }),
            Some("timeout") => Err(FetchError::Timeout {
                source: source.clone(),
                waited_ms: 1,
            }),
            Some(other) => panic!("unknown failure kind {}", other),
            None => Ok(feed.listings.clone()),
        }
    }
}

#[async_trait]
impl ListingSource for ScriptedSource {
    fn fetch_blocking(&self, source: &SourceId) -> Result<Vec<Listing>, FetchError> {
        let feed = self.feed(source);
        std::thread::sleep(feed.delay);
        Self::outcome(feed, source)
    }

    async fn fetch(&self, source: &SourceId) -> Result<Vec<Listing>, FetchError> {
        let feed = self.feed(source);
        tokio::time::sleep(feed.delay).await;
        Self::outcome(feed, source)
    }
}

fn listing(id: i64, price: f64) -> Listing {
    Listing {
        id,
        make: "Toyota".to_string(),
        model: "Corolla".to_string(),
        year: 2021,
        price,
    }
}

fn ids(listings: &[Listing]) -> Vec<i64> {
    listings.iter().map(|l| l.id).collect()
}

fn registry(names: &[&str]) -> Vec<SourceId> {
    names.iter().map(|n| SourceId::from(*n)).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_all_strategies_return_the_same_listings() {
    init_worker_pool();
    let fetcher: Arc<dyn ListingSource> = Arc::new(
        ScriptedSource::new()
            .serving("a", vec![listing(1, 9_500.0), listing(2, 11_000.0)])
            .serving("b", vec![listing(3, 55_000.0)])
            .serving("c", vec![listing(4, 7_250.0), listing(5, 8_100.0)]),
    );
    let sources = registry(&["a", "b", "c"]);

    for strategy in Strategy::ALL {
        let result = run_strategy(strategy, &sources, fetcher.clone())
            .await
            .unwrap();
        assert_eq!(ids(&result), vec![1, 2, 3, 4, 5], "strategy {}", strategy);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_empty_registry_yields_empty_aggregate() {
    init_worker_pool();
    let fetcher: Arc<dyn ListingSource> = Arc::new(ScriptedSource::new());

    for strategy in Strategy::ALL {
        let result = run_strategy(strategy, &[], fetcher.clone()).await.unwrap();
        assert!(result.is_empty(), "strategy {}", strategy);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_aggregation_is_repeatable() {
    init_worker_pool();
    let fetcher: Arc<dyn ListingSource> = Arc::new(
        ScriptedSource::new()
            .serving("a", vec![listing(1, 10.0), listing(2, 20.0)])
            .serving("b", vec![listing(3, 30.0)]),
    );
    let sources = registry(&["a", "b"]);

    for strategy in Strategy::ALL {
        let first = run_strategy(strategy, &sources, fetcher.clone())
            .await
            .unwrap();
        let second = run_strategy(strategy, &sources, fetcher.clone())
            .await
            .unwrap();
        assert_eq!(first, second, "strategy {}", strategy);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_first_feed_keeps_registry_order() {
    init_worker_pool();
    let fetcher: Arc<dyn ListingSource> = Arc::new(
        ScriptedSource::new()
            .serving_slow(
                "slow",
                vec![listing(1, 10.0), listing(2, 20.0)],
                Duration::from_millis(150),
            )
            .serving("fast", vec![listing(3, 30.0)]),
    );
    let sources = registry(&["slow", "fast"]);

    // every order-guaranteed strategy, including the ones where "fast" is
    // certain to complete first
    for strategy in [
        Strategy::Parallel,
        Strategy::SequentialAsync,
        Strategy::ConcurrentBlocking,
        Strategy::Concurrent,
    ] {
        let result = run_strategy(strategy, &sources, fetcher.clone())
            .await
            .unwrap();
        assert_eq!(ids(&result), vec![1, 2, 3], "strategy {}", strategy);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fail_fast_skips_remaining_feeds() {
    let fetcher = ScriptedSource::new()
        .serving("a", vec![listing(1, 10.0)])
        .failing("b", "unreachable")
        .serving("c", vec![listing(2, 20.0)]);
    let sources = registry(&["a", "b", "c"]);

    let err = fetch_all_sequential(&sources, &fetcher).unwrap_err();
    assert!(matches!(
        err,
        AggregateError::Source(FetchError::Unreachable { .. })
    ));
    assert_eq!(fetcher.calls("c"), 0);

    let err = fetch_all_sequential_async(&sources, &fetcher)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AggregateError::Source(FetchError::Unreachable { .. })
    ));
    assert_eq!(fetcher.calls("c"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_waiting_strategies_drain_every_feed() {
    init_worker_pool();
    let fetcher = Arc::new(
        ScriptedSource::new()
            .serving("a", vec![listing(1, 10.0)])
            .failing("b", "decode")
            .serving_slow(
                "c",
                vec![listing(2, 20.0)],
                Duration::from_millis(FEED_LATENCY_MS),
            ),
    );
    let sources = registry(&["a", "b", "c"]);

    for (round, strategy) in [
        Strategy::Parallel,
        Strategy::ConcurrentBlocking,
        Strategy::Concurrent,
    ]
    .into_iter()
    .enumerate()
    {
        let err = run_strategy(strategy, &sources, fetcher.clone())
            .await
            .unwrap_err();
        match err {
            AggregateError::Sources {
                attempted,
                failures,
            } => {
                assert_eq!(attempted, 3, "strategy {}", strategy);
                assert_eq!(failures.len(), 1, "strategy {}", strategy);
                assert_eq!(failures[0].source_id().as_str(), "b", "strategy {}", strategy);
            }
            other => panic!("strategy {}: unexpected error {}", strategy, other),
        }
        // the slow feed was still fetched and awaited despite the failure
        assert_eq!(fetcher.calls("c"), round + 1, "strategy {}", strategy);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failure_report_names_every_failed_feed() {
    init_worker_pool();
    let fetcher = Arc::new(
        ScriptedSource::new()
            .failing("down", "unreachable")
            .serving("ok", vec![listing(1, 10.0)])
            .failing("slowpoke", "timeout"),
    );
    let sources = registry(&["down", "ok", "slowpoke"]);

    for strategy in [
        Strategy::Parallel,
        Strategy::ConcurrentBlocking,
        Strategy::Concurrent,
    ] {
        let err = run_strategy(strategy, &sources, fetcher.clone())
            .await
            .unwrap_err();
        let failed: Vec<&str> = err.failed_sources().iter().map(|s| s.as_str()).collect();
        assert_eq!(failed, vec!["down", "slowpoke"], "strategy {}", strategy);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cheap_and_expensive_feeds_merge_in_feed_order() {
    init_worker_pool();
    let fetcher: Arc<dyn ListingSource> = Arc::new(
        ScriptedSource::new()
            .serving("cheap", vec![listing(1, 10.0)])
            .serving("expensive", vec![listing(2, 90.0)]),
    );
    let sources = registry(&["cheap", "expensive"]);

    for strategy in Strategy::ALL {
        let result = run_strategy(strategy, &sources, fetcher.clone())
            .await
            .unwrap();
        assert_eq!(result.len(), 2, "strategy {}", strategy);
        assert_eq!(ids(&result), vec![1, 2], "strategy {}", strategy);
        assert_eq!(result[0].price, 10.0);
        assert_eq!(result[1].price, 90.0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_strategies_overlap_feed_latency() {
    init_worker_pool();
    let names = ["v", "w", "x", "y", "z"];
    let delay = Duration::from_millis(FEED_LATENCY_MS);

    let mut scripted = ScriptedSource::new();
    for (i, name) in names.iter().enumerate() {
        scripted = scripted.serving_slow(name, vec![listing(i as i64 + 1, 1_000.0)], delay);
    }
    let fetcher: Arc<dyn ListingSource> = Arc::new(scripted);
    let sources = registry(&names);

    // 5 feeds at 100ms each: roughly the sum for the sequential strategies
    let sequential_floor = Duration::from_millis(FEED_LATENCY_MS * names.len() as u64 - 50);
    // and well under the sum for the fanned-out ones
    let overlap_ceiling = Duration::from_millis(FEED_LATENCY_MS * 4);

    for strategy in [Strategy::Sequential, Strategy::SequentialAsync] {
        let started = Instant::now();
        run_strategy(strategy, &sources, fetcher.clone())
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert!(
            elapsed >= sequential_floor,
            "strategy {} finished in {:?}",
            strategy,
            elapsed
        );
    }

    for strategy in [
        Strategy::Parallel,
        Strategy::ConcurrentBlocking,
        Strategy::Concurrent,
    ] {
        let started = Instant::now();
        run_strategy(strategy, &sources, fetcher.clone())
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert!(
            elapsed < overlap_ceiling,
            "strategy {} took {:?}",
            strategy,
            elapsed
        );
    }
}
