use anyhow::{Context, Result};
use bluelight::cache::{self, StatusCache};
use bluelight::dispatch::Dispatcher;
use bluelight::display;
use bluelight::fetch::{Fetcher, HttpSource};
use bluelight::{AppState, Args};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cache_path = match &args.cache_path {
        Some(path) => path.clone(),
        None => cache::default_path().context("Error initializing cache")?,
    };
    let cache = StatusCache::open(cache_path)
        .await
        .context("Error initializing cache")?;

    let source = HttpSource::new(args.timeout()).context("Failed to build HTTP client")?;
    let state = AppState {
        cache,
        dispatcher: Dispatcher::new(Fetcher::new(Arc::new(source))),
    };

    if args.cached {
        print!("{}", state.screen(false).await);
        return Ok(());
    }

    if !args.watch {
        state.refresh_or_warn().await;
        print!("{}", state.screen(false).await);
        return Ok(());
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        display::clear_screen()?;
        let frame = async {
            state.refresh_or_warn().await;
            print!("{}", state.screen(true).await);
            tokio::time::sleep(args.interval()).await;
        };

        tokio::select! {
            _ = frame => {}
            _ = &mut shutdown => {
                info!("interrupted, exiting watch mode");
                break;
            }
        }
    }

    Ok(())
}
