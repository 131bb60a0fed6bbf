//! Fetching action sources from git remotes
//!
//! [`GitCloner`] retrieves one working tree, retrying transport failures
//! and correcting a wrong branch/tag guess. [`CacheCloner`] puts it behind
//! the keyed cache so each (location, ref, commit) is fetched once.

mod cached;
mod git;
mod retry;

pub use cached::{cache_key, CacheCloner, FetchTarget, FetchedAction, DEFAULT_HOST};
pub use git::{fetch_with_fallback, GitCloner};
pub use retry::{retry_transient, RetryPolicy};

use crate::error::ActfetchResult;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// What to fetch and where to put it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneParams {
    /// Remote location
    pub repo: String,
    /// Version selector, short or fully qualified (empty = default branch)
    pub reference: String,
    /// Exact commit to check out after fetching
    pub sha: Option<String>,
    /// Target directory
    pub dir: PathBuf,
}

/// Something that can materialize a repository into a directory
#[async_trait]
pub trait Cloner: Send + Sync {
    /// Populate `params.dir` with the requested tree.
    ///
    /// `cancel` aborts in-flight transfers.
    async fn clone_repo(&self, cancel: &CancellationToken, params: &CloneParams)
        -> ActfetchResult<()>;
}
