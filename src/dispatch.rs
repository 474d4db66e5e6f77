use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::fetch::{FetchError, FetchOutcome, Fetcher};

/// Fans one fetch per region out onto the runtime and joins them all.
#[derive(Clone)]
pub struct Dispatcher {
    fetcher: Fetcher,
}

impl Dispatcher {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Returns exactly one outcome per region. Waits for every fetch, so the
    /// slowest region (bounded by the request timeout) sets the latency.
    pub async fn fetch_all(&self, regions: &[&str]) -> HashMap<String, FetchOutcome> {
        let results = Arc::new(Mutex::new(HashMap::with_capacity(regions.len())));

        let tasks = regions.iter().map(|region| {
            let region = region.to_string();
            let fetcher = self.fetcher.clone();
            let results = Arc::clone(&results);

            let handle = tokio::spawn({
                let region = region.clone();
                async move {
                    let outcome = fetcher.fetch(&region).await;
                    results.lock().await.insert(region, outcome);
                }
            });

            async move { (region, handle.await) }
        });

        let joined = join_all(tasks).await;
        let mut results = std::mem::take(&mut *results.lock().await);

        for (region, joined) in joined {
            if let Err(err) = joined {
                warn!(region = %region, error = %err, "fetch task did not complete");
                results.entry(region.clone()).or_insert_with(|| {
                    FetchOutcome::failed(region, FetchError::Aborted(err.to_string()))
                });
            }
        }

        let failed = results.values().filter(|outcome| outcome.is_error()).count();
        info!(regions = results.len(), failed, "fetched statuses");

        results
    }
}
