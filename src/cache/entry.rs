//! Cache entry layout and state
//!
//! Every key maps to `<root>/<sha256-hex-of-key>/` holding a lock file, a
//! completion marker and the payload directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// Lock file taken for the whole population attempt
pub const LOCK_FILE: &str = ".started";

/// Zero-byte marker written once population succeeded
pub const COMPLETION_MARKER: &str = ".done";

/// Directory holding the cached content
pub const PAYLOAD_DIR: &str = "data";

/// Hex length of a key digest
pub const DIGEST_LEN: usize = 64;

/// Hash a cache key to its directory name
pub fn key_digest(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Whether a directory name looks like a key digest
pub fn is_digest(name: &str) -> bool {
    name.len() == DIGEST_LEN && name.bytes().all(|b| b.is_ascii_hexdigit())
}

/// State of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No directory exists yet
    Miss,
    /// Directory exists without a marker: in progress or interrupted
    Building,
    /// Marker present, payload is final
    Complete,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Miss => write!(f, "miss"),
            Self::Building => write!(f, "building"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Paths of a single cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    dir: PathBuf,
}

impl CacheEntry {
    /// Entry for `key` under `root`
    pub fn new(root: &Path, key: &str) -> Self {
        Self {
            dir: root.join(key_digest(key)),
        }
    }

    /// Entry for an existing entry directory
    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Entry directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Digest part of the path
    pub fn digest(&self) -> String {
        self.dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    pub fn marker_path(&self) -> PathBuf {
        self.dir.join(COMPLETION_MARKER)
    }

    pub fn payload_dir(&self) -> PathBuf {
        self.dir.join(PAYLOAD_DIR)
    }

    /// Whether the completion marker exists
    pub fn is_complete(&self) -> bool {
        self.marker_path().exists()
    }

    /// Current state, read without taking the lock
    pub fn state(&self) -> CacheState {
        if self.is_complete() {
            CacheState::Complete
        } else if self.dir.is_dir() {
            CacheState::Building
        } else {
            CacheState::Miss
        }
    }

    /// When the marker was written, if the entry is complete
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        std::fs::metadata(self.marker_path())
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }
}
