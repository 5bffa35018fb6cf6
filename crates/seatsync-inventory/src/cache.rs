//! Snapshot cache.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogSnapshot;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file {path} is not a snapshot: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Storage for the last catalog snapshot.
pub trait SnapshotCache: Send + Sync {
    /// The stored snapshot, or `None` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the store exists but cannot be read.
    fn load(&self) -> Result<Option<CatalogSnapshot>, CacheError>;

    /// Replaces the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the store cannot be written.
    fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), CacheError>;

    /// How long ago the snapshot was taken.
    fn age_of(&self, snapshot: &CatalogSnapshot) -> chrono::Duration {
        Utc::now() - snapshot.last_updated
    }
}

/// A snapshot kept as pretty-printed JSON in one file.
#[derive(Debug, Clone)]
pub struct FileSnapshotCache {
    path: PathBuf,
}

impl FileSnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

impl SnapshotCache for FileSnapshotCache {
    fn load(&self) -> Result<Option<CatalogSnapshot>, CacheError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.display_path(),
                    source,
                })
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| CacheError::Json {
                path: self.display_path(),
                source,
            })
    }

    fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), CacheError> {
        let text = serde_json::to_string_pretty(snapshot).map_err(|source| CacheError::Json {
            path: self.display_path(),
            source,
        })?;
        std::fs::write(&self.path, text).map_err(|source| CacheError::Io {
            path: self.display_path(),
            source,
        })
    }
}

/// When a cached snapshot may be served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// `None` means a snapshot never expires on its own.
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { ttl }
    }

    /// Whether a snapshot of the given age may still be served.
    #[must_use]
    pub fn is_fresh(&self, age: chrono::Duration) -> bool {
        let Some(ttl) = self.ttl else {
            return true;
        };
        chrono::Duration::from_std(ttl).map_or(true, |ttl| age < ttl)
    }
}

/// Summary of what the cache currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub has_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CacheInfo {
    fn empty() -> Self {
        Self {
            has_cache: false,
            last_updated: None,
            age_minutes: None,
            products_count: None,
            slots_count: None,
            dates_count: None,
            error: None,
        }
    }
}

#[must_use]
pub fn cache_info(cache: &dyn SnapshotCache) -> CacheInfo {
    match cache.load() {
        Ok(Some(snapshot)) => CacheInfo {
            has_cache: true,
            last_updated: Some(snapshot.last_updated),
            age_minutes: Some(cache.age_of(&snapshot).num_minutes()),
            products_count: Some(snapshot.total_products),
            slots_count: Some(snapshot.total_slots),
            dates_count: Some(snapshot.total_dates),
            error: None,
        },
        Ok(None) => CacheInfo::empty(),
        Err(e) => CacheInfo {
            error: Some(e.to_string()),
            ..CacheInfo::empty()
        },
    }
}
