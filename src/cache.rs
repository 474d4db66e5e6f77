use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::fetch::FetchOutcome;

const CACHE_DIR_NAME: &str = "csuitebluelight";
const CACHE_FILE_NAME: &str = "statuses.json";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("could not determine the user cache directory")]
    NoCacheDir,

    #[error("failed to create cache directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write cache {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// On-disk form of the latest outcome for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    fn from_outcome(outcome: &FetchOutcome, now: DateTime<Utc>) -> Self {
        Self {
            status: outcome.status.clone(),
            error: outcome.error.clone().unwrap_or_default(),
            updated_at: now,
        }
    }

    fn to_outcome(&self, region: &str) -> FetchOutcome {
        FetchOutcome {
            region: region.to_string(),
            status: self.status.clone(),
            error: (!self.error.is_empty()).then(|| self.error.clone()),
        }
    }
}

/// How the cache was seeded at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { entries: usize },
    Defaulted(DefaultReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultReason {
    Missing,
    Unreadable(String),
    Malformed(String),
}

/// `<user cache dir>/csuitebluelight/statuses.json`
pub fn default_path() -> Result<PathBuf, CacheError> {
    let dir = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
    Ok(dir.join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
}

/// Latest status per region, mirrored to a single JSON file.
///
/// Reads share the lock; writes hold it exclusively through the disk write so
/// two writers never persist their snapshots out of order. Nothing guards the
/// file against other processes.
#[derive(Debug)]
pub struct StatusCache {
    statuses: RwLock<BTreeMap<String, CacheEntry>>,
    file_path: PathBuf,
    load_outcome: LoadOutcome,
}

impl StatusCache {
    /// Creates the parent directory if needed, then loads whatever is there.
    pub async fn open(file_path: PathBuf) -> Result<Self, CacheError> {
        if let Some(dir) = file_path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| CacheError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        Ok(Self::with_path(file_path).await)
    }

    pub async fn with_path(file_path: PathBuf) -> Self {
        let (statuses, load_outcome) = load(&file_path).await;
        debug!(path = %file_path.display(), outcome = ?load_outcome, "loaded status cache");

        Self {
            statuses: RwLock::new(statuses),
            file_path,
            load_outcome,
        }
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub async fn update(&self, outcome: FetchOutcome) -> Result<(), CacheError> {
        let mut statuses = self.statuses.write().await;
        let entry = CacheEntry::from_outcome(&outcome, Utc::now());
        statuses.insert(outcome.region, entry);

        self.save(&statuses).await
    }

    /// Applies a whole batch under one lock with one shared timestamp and
    /// writes the file once.
    pub async fn update_all(
        &self,
        outcomes: HashMap<String, FetchOutcome>,
    ) -> Result<(), CacheError> {
        let mut statuses = self.statuses.write().await;
        let now = Utc::now();
        for (region, outcome) in outcomes {
            statuses.insert(region, CacheEntry::from_outcome(&outcome, now));
        }

        self.save(&statuses).await
    }

    pub async fn get(&self, region: &str) -> Option<FetchOutcome> {
        let statuses = self.statuses.read().await;
        statuses.get(region).map(|entry| entry.to_outcome(region))
    }

    pub async fn get_all(&self) -> HashMap<String, FetchOutcome> {
        let statuses = self.statuses.read().await;
        statuses
            .iter()
            .map(|(region, entry)| (region.clone(), entry.to_outcome(region)))
            .collect()
    }

    pub async fn get_updated_at(&self, region: &str) -> Option<DateTime<Utc>> {
        let statuses = self.statuses.read().await;
        statuses.get(region).map(|entry| entry.updated_at)
    }

    async fn save(&self, statuses: &BTreeMap<String, CacheEntry>) -> Result<(), CacheError> {
        let data = serde_json::to_vec_pretty(statuses)?;
        tokio::fs::write(&self.file_path, data)
            .await
            .map_err(|source| CacheError::Write {
                path: self.file_path.clone(),
                source,
            })?;

        info!(path = %self.file_path.display(), regions = statuses.len(), "saved status cache");
        Ok(())
    }
}

async fn load(path: &Path) -> (BTreeMap<String, CacheEntry>, LoadOutcome) {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return (BTreeMap::new(), LoadOutcome::Defaulted(DefaultReason::Missing));
        }
        Err(err) => {
            let reason = DefaultReason::Unreadable(err.to_string());
            return (BTreeMap::new(), LoadOutcome::Defaulted(reason));
        }
    };

    match serde_json::from_slice::<BTreeMap<String, CacheEntry>>(&data) {
        Ok(statuses) => {
            let entries = statuses.len();
            (statuses, LoadOutcome::Loaded { entries })
        }
        Err(err) => {
            let reason = DefaultReason::Malformed(err.to_string());
            (BTreeMap::new(), LoadOutcome::Defaulted(reason))
        }
    }
}
