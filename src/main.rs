mod aggregation;
mod cli;
mod display;
mod errors;
mod sources;
mod types;

use aggregation::run_strategy;
use cli::Args;
use display::{display_listing_table, display_timing_table, StrategyTiming};
use sources::{create_client, ListingSource};
use types::{Config, Strategy};

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize Rayon thread pool
    let num_threads = std::thread::available_parallelism()
        .map(|x| x.get())
        .unwrap_or(4)
        .max(4);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("rayon-worker-{}", i))
        .build_global()
        .expect("Failed to initialize Rayon thread pool");

    info!("Initialized Rayon thread pool with {} threads", num_threads);

    let args = Args::parse();
    let config = args.into_config()?;

    info!("Starting listing factory with config: {:?}", config);

    let fetcher = create_client(&config);

    if config.compare {
        let report = compare_strategies(&config, fetcher).await?;
        display_timing_table(&report);
        return Ok(());
    }

    let strategy = config.strategy;
    let sources = config.sources.clone();
    let started = Instant::now();
    // Run inside a spawned task so the blocking strategies park a runtime
    // worker rather than the main thread driving this future.
    let outcome = tokio::spawn(async move { run_strategy(strategy, &sources, fetcher).await })
        .await?;
    let elapsed = started.elapsed();

    let listings = match outcome {
        Ok(listings) => listings,
        Err(e) => {
            for source in e.failed_sources() {
                warn!("feed {} failed", source);
            }
            return Err(e.into());
        }
    };

    info!(
        "Aggregated {} listings from {} feeds in {:?} via {}",
        listings.len(),
        config.sources.len(),
        elapsed,
        strategy
    );

    display_listing_table(&listings);

    Ok(())
}

async fn compare_strategies(
    config: &Config,
    fetcher: Arc<dyn ListingSource>,
) -> Result<Vec<StrategyTiming>> {
    let mut report = Vec::new();

    for strategy in Strategy::ALL {
        let sources = config.sources.clone();
        let fetcher = fetcher.clone();
        let started = Instant::now();
        let outcome =
            tokio::spawn(async move { run_strategy(strategy, &sources, fetcher).await }).await?;
        let elapsed = started.elapsed();

        match &outcome {
            Ok(listings) => info!("{}: {} listings in {:?}", strategy, listings.len(), elapsed),
            Err(e) => warn!("{}: failed in {:?}: {}", strategy, elapsed, e),
        }

        report.push(StrategyTiming {
            strategy,
            elapsed,
            outcome: outcome.map(|l| l.len()).map_err(|e| e.to_string()),
        });
    }

    Ok(report)
}
