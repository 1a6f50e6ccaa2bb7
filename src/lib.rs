pub mod aggregation;
pub mod display;
pub mod errors;
pub mod sources;
pub mod types;

// Re-exports for library users
pub use aggregation::{
    fetch_all_concurrent, fetch_all_concurrent_blocking, fetch_all_parallel, fetch_all_sequential,
    fetch_all_sequential_async, run_strategy,
};
pub use display::{display_listing_table, display_timing_table, StrategyTiming};
pub use errors::{AggregateError, FetchError};
pub use sources::{create_client, FeedClient, ListingSource};
pub use types::{Config, Listing, SourceId, Strategy, DEFAULT_FETCH_TIMEOUT_SECS};
