//! Cross-process entry lock
//!
//! An advisory exclusive lock on the entry's lock file. The lock belongs to
//! the open file, so it is honored between processes and between separate
//! opens inside one process. It is released when the guard drops, and by
//! the OS if the process dies while holding it.

use crate::error::{ActfetchError, ActfetchResult};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Held exclusive lock on a cache entry
#[derive(Debug)]
pub struct EntryLock {
    file: File,
    path: PathBuf,
}

impl EntryLock {
    /// Block until the lock is ours.
    ///
    /// Runs on the blocking pool; there is no timeout.
    pub async fn acquire(path: PathBuf) -> ActfetchResult<Self> {
        tokio::task::spawn_blocking(move || Self::acquire_blocking(path))
            .await
            .map_err(|e| ActfetchError::Internal(format!("lock task failed: {}", e)))?
    }

    /// Synchronous variant of [`EntryLock::acquire`]
    pub fn acquire_blocking(path: PathBuf) -> ActfetchResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| ActfetchError::CacheLock {
                path: path.clone(),
                source,
            })?;

        debug!("taking lock {}", path.display());
        file.lock_exclusive()
            .map_err(|source| ActfetchError::CacheLock {
                path: path.clone(),
                source,
            })?;
        debug!("took lock {}", path.display());

        Ok(Self { file, path })
    }

    /// Lock file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for EntryLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            error!("failed to release lock {}: {}", self.path.display(), e);
        }
        debug!("released lock {}", self.path.display());
    }
}
