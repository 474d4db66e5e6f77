use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub mod cache;
pub mod dispatch;
pub mod display;
pub mod fetch;
pub mod registry;

use cache::{CacheError, StatusCache};
use dispatch::Dispatcher;
use fetch::DEFAULT_TIMEOUT;

#[derive(Parser, Debug)]
#[clap(about, version)]
pub struct Args {
    /// Continuously refresh status
    #[clap(short, long)]
    pub watch: bool,

    /// Seconds between refreshes in watch mode
    #[clap(
        short,
        long,
        default_value = "60",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Per-request timeout in seconds
    #[clap(
        short,
        long,
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Cache file to use instead of the per-user cache directory
    #[clap(short, long)]
    pub cache_path: Option<PathBuf>,

    /// Show the last cached statuses without fetching
    #[clap(long, conflicts_with = "watch")]
    pub cached: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

pub struct AppState {
    pub cache: StatusCache,
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Fetches every region and stores the batch.
    pub async fn refresh(&self) -> Result<(), CacheError> {
        let outcomes = self.dispatcher.fetch_all(&registry::REGIONS).await;
        self.cache.update_all(outcomes).await
    }

    /// Like `refresh`, but a failed cache write only costs persistence: the
    /// in-memory statuses are already updated and still get displayed.
    pub async fn refresh_or_warn(&self) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "could not persist statuses");
        }
    }

    pub async fn screen(&self, footer: bool) -> String {
        let statuses = self.cache.get_all().await;
        let updated_at = self.cache.get_updated_at("overall").await;
        display::render(&statuses, updated_at, footer)
    }
}
