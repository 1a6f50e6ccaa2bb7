//! Aggregation strategies: fetch every feed in the registry and merge the
//! results into one collection.
//!
//! All five strategies produce the same collection for an all-success run.
//! They differ in how the fetches are issued and joined, and in their failure
//! policy: the sequential strategies abort on the first failing feed, the
//! fanned-out strategies drain every feed before reporting.

use std::sync::Arc;

use rayon::prelude::*;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::{AggregateError, FetchError};
use crate::sources::ListingSource;
use crate::types::{Listing, SourceId, Strategy};

/// Run the chosen strategy against the feed registry.
pub async fn run_strategy(
    strategy: Strategy,
    sources: &[SourceId],
    fetcher: Arc<dyn ListingSource>,
) -> Result<Vec<Listing>, AggregateError> {
    debug!("aggregating {} feeds via {}", sources.len(), strategy);
    match strategy {
        Strategy::Sequential => fetch_all_sequential(sources, fetcher.as_ref()),
        Strategy::Parallel => fetch_all_parallel(sources, fetcher.as_ref()),
        Strategy::SequentialAsync => fetch_all_sequential_async(sources, fetcher.as_ref()).await,
        Strategy::ConcurrentBlocking => fetch_all_concurrent_blocking(sources, fetcher),
        Strategy::Concurrent => fetch_all_concurrent(sources, fetcher).await,
    }
}

/// Fetch feeds one at a time on the calling thread, in registry order.
///
/// Output order is registry order, with each feed's listings kept in the
/// order the feed returned them. Wall clock is the sum of the individual
/// fetch latencies. The first failing feed aborts the run: listings
/// accumulated so far are discarded and the remaining feeds are never
/// contacted. The baseline the other strategies are measured against.
pub fn fetch_all_sequential(
    sources: &[SourceId],
    fetcher: &dyn ListingSource,
) -> Result<Vec<Listing>, AggregateError> {
    let mut merged = Vec::new();
    for source in sources {
        let listings = fetcher.fetch_blocking(source)?;
        debug!("fetched {} listings from {}", listings.len(), source);
        merged.extend(listings);
    }
    Ok(merged)
}

/// Fetch all feeds on the rayon worker pool, one blocking fetch per worker.
///
/// Each worker's outcome lands in the slot keyed by its feed's registry
/// position (rayon's indexed collect), so the output order still equals
/// registry order and the join needs no locks. Wall clock approaches the
/// slowest single fetch once the pool is at least as wide as the registry.
/// Every feed is fetched even when some fail; any failure fails the whole run
/// with all failing feeds reported and the successful results dropped.
pub fn fetch_all_parallel(
    sources: &[SourceId],
    fetcher: &dyn ListingSource,
) -> Result<Vec<Listing>, AggregateError> {
    let outcomes: Vec<Result<Vec<Listing>, FetchError>> = sources
        .par_iter()
        .map(|source| fetcher.fetch_blocking(source))
        .collect();
    merge_outcomes(outcomes)
}

/// Fetch feeds one at a time, suspending the calling task per fetch.
///
/// Join order and fail-fast behavior match [`fetch_all_sequential`], and wall
/// clock is still the sum of latencies. The difference is in the resource
/// contract: the host thread stays free to run other tasks while each fetch
/// is outstanding.
pub async fn fetch_all_sequential_async(
    sources: &[SourceId],
    fetcher: &dyn ListingSource,
) -> Result<Vec<Listing>, AggregateError> {
    let mut merged = Vec::new();
    for source in sources {
        let listings = fetcher.fetch(source).await?;
        debug!("fetched {} listings from {}", listings.len(), source);
        merged.extend(listings);
    }
    Ok(merged)
}

/// Issue every fetch concurrently, then block the calling thread until all of
/// them have resolved.
///
/// Spawns one task per feed and parks the calling runtime worker for the full
/// duration of the join. The spawned fetches resume on the runtime's other
/// workers, never on the parked thread, which is what keeps this join from
/// deadlocking; on a current-thread runtime `block_in_place` panics instead.
/// A worker thread is still held captive while N suspended fetches are in
/// flight, so prefer [`fetch_all_concurrent`] anywhere that matters.
///
/// Output order equals registry order: handles are joined in spawn order.
/// Every feed is awaited, success or failure, before the run reports;
/// failures are aggregated the same way as in [`fetch_all_parallel`].
///
/// # Panics
///
/// Panics when called outside a multi-thread tokio runtime.
pub fn fetch_all_concurrent_blocking(
    sources: &[SourceId],
    fetcher: Arc<dyn ListingSource>,
) -> Result<Vec<Listing>, AggregateError> {
    let tasks = spawn_fetches(sources, fetcher);
    tokio::task::block_in_place(|| Handle::current().block_on(join_outcomes(tasks)))
}

/// Issue every fetch concurrently and suspend until all of them have
/// resolved.
///
/// Same fan-out, ordering, and failure policy as
/// [`fetch_all_concurrent_blocking`], but the join itself suspends, so no
/// thread is held while the fetches run. The strategy the binary defaults to.
pub async fn fetch_all_concurrent(
    sources: &[SourceId],
    fetcher: Arc<dyn ListingSource>,
) -> Result<Vec<Listing>, AggregateError> {
    let tasks = spawn_fetches(sources, fetcher);
    join_outcomes(tasks).await
}

/// Spawn one fetch task per feed, in registry order.
fn spawn_fetches(
    sources: &[SourceId],
    fetcher: Arc<dyn ListingSource>,
) -> Vec<JoinHandle<Result<Vec<Listing>, FetchError>>> {
    sources
        .iter()
        .cloned()
        .map(|source| {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.fetch(&source).await })
        })
        .collect()
}

/// Await every spawned fetch in spawn order and merge the outcomes.
async fn join_outcomes(
    tasks: Vec<JoinHandle<Result<Vec<Listing>, FetchError>>>,
) -> Result<Vec<Listing>, AggregateError> {
    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        let outcome = task
            .await
            .map_err(|e| AggregateError::Worker(e.to_string()))?;
        outcomes.push(outcome);
    }
    merge_outcomes(outcomes)
}

/// Merge per-feed outcomes collected in registry order. Any failure fails the
/// whole run; every failing feed is reported and successful listings from the
/// same run are dropped.
fn merge_outcomes(
    outcomes: Vec<Result<Vec<Listing>, FetchError>>,
) -> Result<Vec<Listing>, AggregateError> {
    let attempted = outcomes.len();
    let mut merged = Vec::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome {
            Ok(listings) => merged.extend(listings),
            Err(e) => failures.push(e),
        }
    }

    if failures.is_empty() {
        Ok(merged)
    } else {
        Err(AggregateError::Sources {
            attempted,
            failures,
        })
    }
}
