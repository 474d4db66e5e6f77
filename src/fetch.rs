use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::registry;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no endpoint configured for region {0}")]
    UnknownRegion(String),

    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("fetch task aborted: {0}")]
    Aborted(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Result of one fetch attempt for one region.
///
/// Exactly one of `status` and `error` carries information: `error` is `None`
/// for a successful fetch, and `status` is empty when `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchOutcome {
    pub region: String,
    pub status: String,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn ok(region: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            status: status.into(),
            error: None,
        }
    }

    pub fn failed(region: impl Into<String>, err: impl Display) -> Self {
        Self {
            region: region.into(),
            status: String::new(),
            error: Some(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Anything that can turn a URL into response text.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// `StatusSource` backed by a pooled reqwest client.
///
/// Non-2xx responses are not errors: deploy endpoints put the status token
/// in the body whatever the HTTP code.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl StatusSource for HttpSource {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        debug!(url, status = %response.status(), "received response");

        response.text().await.map_err(FetchError::Body)
    }
}

#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn StatusSource>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, region: &str) -> FetchOutcome {
        let Some(url) = registry::url_for(region) else {
            return FetchOutcome::failed(region, FetchError::UnknownRegion(region.to_string()));
        };

        match self.source.get_text(url).await {
            Ok(body) => FetchOutcome::ok(region, body.trim()),
            Err(err) => {
                debug!(region, error = %err, "fetch failed");
                FetchOutcome::failed(region, err)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedSource;
    use super::*;

    #[tokio::test]
    async fn trims_body_into_status() {
        let fetcher = Fetcher::new(Arc::new(
            ScriptedSource::default().respond("overall", "complete\n"),
        ));

        let outcome = fetcher.fetch("overall").await;

        assert_eq!(outcome, FetchOutcome::ok("overall", "complete"));
    }

    #[tokio::test]
    async fn transport_failure_becomes_error_outcome() {
        let fetcher = Fetcher::new(Arc::new(
            ScriptedSource::default().fail("au", "connection refused"),
        ));

        let outcome = fetcher.fetch("au").await;

        assert_eq!(outcome.region, "au");
        assert_eq!(outcome.status, "");
        assert_eq!(outcome.error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn unknown_region_is_an_error_not_a_panic() {
        let fetcher = Fetcher::new(Arc::new(ScriptedSource::all("deploy")));

        let outcome = fetcher.fetch("eu").await;

        assert!(outcome.is_error());
        assert!(outcome.error.unwrap().contains("eu"));
    }
}
