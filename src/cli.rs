use anyhow::{anyhow, Result};
use clap::Parser;

use crate::types::{Config, SourceId, Strategy, DEFAULT_FETCH_TIMEOUT_SECS};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Feed addresses, `|`-separated: `http(s)://...` URLs,
    /// `demo(count,delay_ms,base_price)` built-in feeds, or `fail(kind)`
    /// scripted failures (kind: unreachable, decode, timeout).
    #[arg(long, default_value = "demo(3,100,12500)|demo(3,100,87000)", value_delimiter = '|')]
    pub sources: Vec<String>,

    /// Aggregation strategy: sequential, parallel, sequential-async,
    /// concurrent-blocking, or concurrent.
    #[arg(long, default_value = "concurrent")]
    pub strategy: String,

    /// Per-fetch timeout in seconds for HTTP feeds.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout: u64,

    /// Run every strategy against the same feeds and report wall-clock
    /// timings instead of the listing table.
    #[arg(long, default_value_t = false)]
    pub compare: bool,
}

impl Args {
    pub fn into_config(self) -> Result<Config> {
        let strategy = parse_strategy(&self.strategy)?;
        let sources = self.sources.into_iter().map(SourceId::new).collect();

        Ok(Config {
            sources,
            strategy,
            fetch_timeout_secs: self.fetch_timeout,
            compare: self.compare,
        })
    }
}

pub fn parse_strategy(name: &str) -> Result<Strategy> {
    match name {
        "sequential" => Ok(Strategy::Sequential),
        "parallel" => Ok(Strategy::Parallel),
        "sequential-async" => Ok(Strategy::SequentialAsync),
        "concurrent-blocking" => Ok(Strategy::ConcurrentBlocking),
        "concurrent" => Ok(Strategy::Concurrent),
        other => Err(anyhow!(
            "Invalid strategy '{}' (expected sequential, parallel, sequential-async, concurrent-blocking or concurrent)",
            other
        )),
    }
}
