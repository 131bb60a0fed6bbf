//! Cache-backed fetching

use crate::cache::Cache;
use crate::error::{ActfetchError, ActfetchResult};
use crate::fetch::{CloneParams, Cloner};
use crate::manifest::find_manifest;
use crate::reference::{is_commit_hash, resolve, ResolvedReference};
use std::path::{Component, Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Host used for `org/repo` references unless configured otherwise
pub const DEFAULT_HOST: &str = "https://github.com";

/// Identity of a fetch in the cache.
///
/// Components are concatenated without a separator.
pub fn cache_key(repo: &str, reference: &str, sha: Option<&str>) -> String {
    format!("{}{}{}", repo, reference, sha.unwrap_or_default())
}

/// A resolved reference reduced to what the cache and the cloner need
#[derive(Debug, Clone)]
pub struct FetchTarget {
    pub resolved: ResolvedReference,
    /// Ref passed to the cloner (empty when only a commit is pinned)
    pub selector: String,
    pub sha: Option<String>,
    /// Action directory relative to the checkout
    pub subpath: PathBuf,
}

impl FetchTarget {
    /// Resolve `reference` against `default_host`.
    ///
    /// A selector that is a full commit hash becomes the pin and the
    /// default branch is fetched. An explicit `sha` takes precedence.
    pub fn resolve(reference: &str, default_host: &str, sha: Option<&str>) -> ActfetchResult<Self> {
        let resolved = resolve(reference, default_host)?;
        let subpath = checked_subpath(reference, resolved.path())?.to_path_buf();

        let selector_is_commit = is_commit_hash(resolved.reference());
        let (selector, sha) = match sha {
            Some(sha) if selector_is_commit => (String::new(), Some(sha.to_string())),
            Some(sha) => (resolved.reference().to_string(), Some(sha.to_string())),
            None if selector_is_commit => (String::new(), Some(resolved.reference().to_string())),
            None => (resolved.reference().to_string(), None),
        };

        Ok(Self {
            resolved,
            selector,
            sha,
            subpath,
        })
    }

    pub fn url(&self) -> &str {
        self.resolved.url()
    }

    pub fn cache_key(&self) -> String {
        cache_key(self.url(), &self.selector, self.sha.as_deref())
    }

    /// Action directory inside a checkout at `dir`
    pub fn action_dir(&self, dir: &Path) -> PathBuf {
        if self.subpath.as_os_str().is_empty() {
            dir.to_path_buf()
        } else {
            dir.join(&self.subpath)
        }
    }
}

/// An action materialized in the cache
#[derive(Debug, Clone)]
pub struct FetchedAction {
    pub resolved: ResolvedReference,
    /// Repository checkout (the entry's payload directory)
    pub dir: PathBuf,
    /// Checkout joined with the action's subpath
    pub action_dir: PathBuf,
    /// `action.yml` or `action.yaml` inside `action_dir`
    pub manifest: Option<PathBuf>,
}

/// Fetches through a [`Cache`] so each (location, ref, commit) is cloned once
pub struct CacheCloner<C> {
    cloner: C,
    cache: Cache,
    default_host: String,
}

impl<C: Cloner> CacheCloner<C> {
    pub fn new(cloner: C, cache: Cache) -> Self {
        Self {
            cloner,
            cache,
            default_host: DEFAULT_HOST.to_string(),
        }
    }

    /// Host prefix for short `org/repo` references
    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Resolve `reference` with this cloner's default host
    pub fn target(&self, reference: &str, sha: Option<&str>) -> ActfetchResult<FetchTarget> {
        FetchTarget::resolve(reference, &self.default_host, sha)
    }

    /// Clone `repo` at `reference` (and `sha`, if given) through the cache.
    ///
    /// Returns the payload directory, whether it was populated now or by an
    /// earlier call.
    pub async fn clone_repo(
        &self,
        cancel: &CancellationToken,
        repo: &str,
        reference: &str,
        sha: Option<&str>,
    ) -> ActfetchResult<PathBuf> {
        let key = cache_key(repo, reference, sha);
        let payload = self.cache.entry(&key).payload_dir();

        let params = CloneParams {
            repo: repo.to_string(),
            reference: reference.to_string(),
            sha: sha.map(str::to_string),
            dir: payload.clone(),
        };

        let entry = self
            .cache
            .add(&key, || async {
                // Leftovers from an interrupted run; only the marker counts
                clear_payload(&params.dir).await?;
                info!("Cloning {} into {}", repo, params.dir.display());
                self.cloner.clone_repo(cancel, &params).await
            })
            .await?;

        debug!("{} ready at {}", key, entry.dir().display());
        Ok(payload)
    }

    /// Resolve `reference`, clone it through the cache and locate the
    /// action inside the checkout.
    pub async fn fetch_action(
        &self,
        cancel: &CancellationToken,
        reference: &str,
    ) -> ActfetchResult<FetchedAction> {
        let target = self.target(reference, None)?;
        self.fetch(cancel, target).await
    }

    /// Clone an already resolved target and locate the action
    pub async fn fetch(
        &self,
        cancel: &CancellationToken,
        target: FetchTarget,
    ) -> ActfetchResult<FetchedAction> {
        let dir = self
            .clone_repo(cancel, target.url(), &target.selector, target.sha.as_deref())
            .await?;
        let action_dir = target.action_dir(&dir);
        let manifest = find_manifest(&action_dir);
        if manifest.is_none() {
            warn!("no action manifest in {}", action_dir.display());
        }

        Ok(FetchedAction {
            resolved: target.resolved,
            dir,
            action_dir,
            manifest,
        })
    }
}

/// Subpath as a relative path that cannot leave the checkout
fn checked_subpath<'a>(reference: &str, path: &'a str) -> ActfetchResult<&'a Path> {
    let subpath = Path::new(path);
    if subpath
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        Ok(subpath)
    } else {
        Err(ActfetchError::invalid_reference(
            reference,
            format!("action path '{}' escapes the repository", path),
        ))
    }
}

async fn clear_payload(dir: &Path) -> ActfetchResult<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!("removed stale payload {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove {}: {}", dir.display(), e),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ActfetchError::io(format!("creating {}", dir.display()), e))
}
