//! Keyed cache with exclusive, idempotent population

use crate::cache::entry::{is_digest, CacheEntry};
use crate::cache::lock::EntryLock;
use crate::error::{ActfetchError, ActfetchResult};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Cache rooted at a directory
#[derive(Debug, Clone)]
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    /// Create a cache rooted at `root` (created lazily)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry paths for `key`
    pub fn entry(&self, key: &str) -> CacheEntry {
        CacheEntry::new(&self.root, key)
    }

    /// Run `populate` for `key` unless a previous run already completed.
    ///
    /// The entry lock is held around the marker check and `populate`, so
    /// at most one population for a key runs at a time across processes.
    /// The marker is written only after `populate` succeeds; on failure the
    /// entry stays incomplete and the next caller tries again.
    pub async fn add<F, Fut>(&self, key: &str, populate: F) -> ActfetchResult<CacheEntry>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ActfetchResult<()>>,
    {
        let entry = self.entry(key);
        create_entry_dir(entry.dir()).await?;

        let lock = EntryLock::acquire(entry.lock_path()).await?;

        if entry.is_complete() {
            debug!("cache hit for {}", entry.dir().display());
            return Ok(entry);
        }

        debug!("cache miss for {}, populating", entry.dir().display());
        populate()
            .await
            .map_err(|source| ActfetchError::CachePopulate {
                key: key.to_string(),
                source: Box::new(source),
            })?;

        let marker = entry.marker_path();
        fs::File::create(&marker)
            .await
            .map_err(|source| ActfetchError::CacheMarker {
                path: marker.clone(),
                source,
            })?;

        drop(lock);
        Ok(entry)
    }

    /// All entries under the root, sorted by digest.
    ///
    /// Reads directory state only; takes no locks.
    pub async fn list(&self) -> ActfetchResult<Vec<CacheEntry>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            ActfetchError::io(format!("reading cache root {}", self.root.display()), e)
        })?;

        let mut entries = Vec::new();
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| ActfetchError::io("reading cache entry", e))?
        {
            let path = item.path();
            let is_entry = path.is_dir()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(is_digest);
            if is_entry {
                entries.push(CacheEntry::at(path));
            }
        }

        entries.sort_by_key(|entry| entry.digest());
        Ok(entries)
    }
}

async fn create_entry_dir(dir: &Path) -> ActfetchResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);

    builder
        .create(dir)
        .await
        .map_err(|e| ActfetchError::io(format!("creating cache directory {}", dir.display()), e))
}
