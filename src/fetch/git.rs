//! Git-backed cloner
//!
//! Each attempt starts from an empty directory, initializes a repository,
//! fetches a single ref and checks it out. Transport failures are retried
//! with backoff; a missing ref is retried once under the other namespace.

use crate::config::FetchConfig;
use crate::error::{ActfetchError, ActfetchResult};
use crate::fetch::retry::{retry_transient, RetryPolicy};
use crate::fetch::{CloneParams, Cloner};
use crate::reference::{invert, qualify};
use async_trait::async_trait;
use std::future::Future;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fetches repositories with the `git` CLI
#[derive(Clone)]
pub struct GitCloner {
    depth: u32,
    token: Option<String>,
    retry: RetryPolicy,
    timeout: Option<Duration>,
}

/// Remote and ref an attempt is working on, for error reporting
struct Target<'a> {
    url: &'a str,
    reference: &'a str,
}

impl Target<'_> {
    fn transport(&self, reason: impl Into<String>) -> ActfetchError {
        ActfetchError::Transport {
            url: self.url.to_string(),
            reference: self.reference.to_string(),
            reason: reason.into(),
        }
    }

    fn not_found(&self) -> ActfetchError {
        ActfetchError::ReferenceNotFound {
            url: self.url.to_string(),
            reference: self.reference.to_string(),
        }
    }
}

impl GitCloner {
    /// Cloner with the default retry policy, no token and no timeout.
    /// A `depth` of 0 fetches full history.
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            token: None,
            retry: RetryPolicy::default(),
            timeout: None,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.depth)
            .with_token(config.token())
            .with_retry(RetryPolicy::from(&config.retry))
            .with_timeout(config.timeout())
    }

    /// Bearer token sent to the remote
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Upper bound for a single git invocation
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, dir: &Path, args: &[String]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(dir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Passed through the environment so it never shows up in argv
        if let Some(token) = &self.token {
            cmd.env("GIT_CONFIG_COUNT", "1")
                .env("GIT_CONFIG_KEY_0", "http.extraHeader")
                .env("GIT_CONFIG_VALUE_0", format!("Authorization: Bearer {}", token));
        }
        cmd
    }

    async fn git(
        &self,
        dir: &Path,
        args: &[String],
        cancel: &CancellationToken,
        target: &Target<'_>,
    ) -> ActfetchResult<Output> {
        if cancel.is_cancelled() {
            return Err(ActfetchError::Cancelled {
                url: target.url.to_string(),
            });
        }

        debug!("Executing: git {:?}", args);
        let output = self.command(dir, args).output();
        let bounded = async move {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, output).await.map_err(|_| {
                    target.transport(format!(
                        "git {} timed out after {}s",
                        args.first().map(String::as_str).unwrap_or_default(),
                        limit.as_secs()
                    ))
                }),
                None => Ok(output.await),
            }
        };

        let output = tokio::select! {
            result = bounded => result?,
            _ = cancel.cancelled() => {
                return Err(ActfetchError::Cancelled {
                    url: target.url.to_string(),
                });
            }
        };

        output.map_err(|e| ActfetchError::command_failed(format!("git {}", args.join(" ")), e))
    }

    /// Run a local git step that has no remote failure modes
    async fn git_local(
        &self,
        dir: &Path,
        args: &[String],
        cancel: &CancellationToken,
        target: &Target<'_>,
    ) -> ActfetchResult<()> {
        let output = self.git(dir, args, cancel, target).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ActfetchError::command_exec(
                format!("git {}", args.join(" ")),
                String::from_utf8_lossy(&output.stderr).trim(),
            ))
        }
    }

    /// One complete attempt at fetching `reference` into `params.dir`
    async fn fetch_once(
        &self,
        params: &CloneParams,
        reference: String,
        cancel: &CancellationToken,
    ) -> ActfetchResult<()> {
        let target = Target {
            url: &params.repo,
            reference: &reference,
        };
        let dir = params.dir.as_path();
        reset_dir(dir).await?;

        self.git_local(dir, &argv(&["init", "--quiet"]), cancel, &target)
            .await?;
        self.git_local(
            dir,
            &argv(&["remote", "add", "origin", &params.repo]),
            cancel,
            &target,
        )
        .await?;

        // A pinned commit may sit anywhere in history
        let depth = if params.sha.is_some() { 0 } else { self.depth };
        let fetch = fetch_args(&reference, depth);
        let output = self.git(dir, &fetch, cancel, &target).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_fetch_failure(&target, &stderr, output.status));
        }

        self.git_local(
            dir,
            &argv(&[
                "-c",
                "advice.detachedHead=false",
                "checkout",
                "--quiet",
                "FETCH_HEAD",
            ]),
            cancel,
            &target,
        )
        .await
    }

    /// Make `sha` available locally when the fetched ref does not reach it.
    ///
    /// The commit is requested directly first; servers that refuse
    /// unadvertised objects get a fetch of every branch instead.
    async fn ensure_commit(
        &self,
        params: &CloneParams,
        sha: &str,
        cancel: &CancellationToken,
    ) -> ActfetchResult<()> {
        let target = Target {
            url: &params.repo,
            reference: sha,
        };
        let dir = params.dir.as_path();

        let present = argv(&["cat-file", "-e", &format!("{}^{{commit}}", sha)]);
        if self.git(dir, &present, cancel, &target).await?.status.success() {
            return Ok(());
        }

        debug!("{} not reachable from fetched ref, requesting it directly", sha);
        let output = self.git(dir, &fetch_args(sha, 0), cancel, &target).await?;
        if output.status.success() {
            return Ok(());
        }
        debug!(
            "Direct fetch of {} refused: {}",
            sha,
            String::from_utf8_lossy(&output.stderr).trim()
        );

        let heads = fetch_all_heads_args();
        retry_transient(&self.retry, || async {
            let output = self.git(dir, &heads, cancel, &target).await?;
            if output.status.success() {
                Ok(())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(classify_fetch_failure(&target, &stderr, output.status))
            }
        })
        .await
    }

    async fn checkout_commit(
        &self,
        params: &CloneParams,
        sha: &str,
        cancel: &CancellationToken,
    ) -> ActfetchResult<()> {
        let target = Target {
            url: &params.repo,
            reference: sha,
        };
        let checkout = argv(&["-c", "advice.detachedHead=false", "checkout", "--quiet", sha]);
        let output = self.git(&params.dir, &checkout, cancel, &target).await?;

        if output.status.success() {
            debug!("Checked out {} in {}", sha, params.dir.display());
            Ok(())
        } else {
            Err(ActfetchError::Checkout {
                sha: sha.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl Cloner for GitCloner {
    async fn clone_repo(
        &self,
        cancel: &CancellationToken,
        params: &CloneParams,
    ) -> ActfetchResult<()> {
        let fetched = fetch_with_fallback(&self.retry, &params.repo, &params.reference, |r| {
            self.fetch_once(params, r, cancel)
        })
        .await?;

        info!(
            "Fetched {} at {}",
            params.repo,
            if fetched.is_empty() { "HEAD" } else { fetched.as_str() }
        );

        if let Some(sha) = &params.sha {
            self.ensure_commit(params, sha, cancel).await?;
            self.checkout_commit(params, sha, cancel).await?;
        }
        Ok(())
    }
}

/// Fetch `reference` with transient retries, correcting a wrong guess.
///
/// The short name is qualified first. If the remote reports the qualified
/// ref missing and the name was short, the other namespace is tried with
/// its own retry budget. When both fail, the first error is returned so the
/// caller sees the name that was originally guessed.
///
/// Returns the qualified ref that was fetched.
pub async fn fetch_with_fallback<F, Fut>(
    policy: &RetryPolicy,
    url: &str,
    reference: &str,
    mut attempt: F,
) -> ActfetchResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ActfetchResult<()>>,
{
    let qualified = qualify(reference);
    let err = match retry_transient(policy, || attempt(qualified.clone())).await {
        Ok(()) => return Ok(qualified),
        Err(err) => err,
    };

    if !err.is_reference_not_found() {
        return Err(err);
    }
    let Some(inverted) = invert(&qualified, reference) else {
        return Err(err);
    };

    info!("{} not found in {}, trying {}", qualified, url, inverted);
    match retry_transient(policy, || attempt(inverted.clone())).await {
        Ok(()) => Ok(inverted),
        Err(inverted_err) => {
            warn!("{} failed as well: {}", inverted, inverted_err);
            Err(err)
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Arguments for fetching one ref; an empty ref means the remote HEAD
fn fetch_args(reference: &str, depth: u32) -> Vec<String> {
    let mut args = argv(&["fetch", "--no-tags", "--quiet"]);
    if depth > 0 {
        args.push("--depth".to_string());
        args.push(depth.to_string());
    }
    args.push("origin".to_string());
    args.push(if reference.is_empty() {
        "HEAD".to_string()
    } else {
        reference.to_string()
    });
    args
}

/// Arguments for fetching every branch with full history
fn fetch_all_heads_args() -> Vec<String> {
    argv(&[
        "fetch",
        "--no-tags",
        "--quiet",
        "origin",
        "+refs/heads/*:refs/remotes/origin/*",
    ])
}

/// Whether git's stderr says the requested ref does not exist
fn is_missing_ref(stderr: &str) -> bool {
    stderr.contains("couldn't find remote ref")
        || (stderr.contains("Remote branch") && stderr.contains("not found"))
}

fn classify_fetch_failure(
    target: &Target<'_>,
    stderr: &str,
    status: std::process::ExitStatus,
) -> ActfetchError {
    if is_missing_ref(stderr) {
        return target.not_found();
    }
    let reason = stderr.trim();
    if reason.is_empty() {
        target.transport(format!("git fetch exited with {}", status))
    } else {
        target.transport(reason)
    }
}

async fn reset_dir(dir: &Path) -> ActfetchResult<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(ActfetchError::io(format!("clearing {}", dir.display()), e)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ActfetchError::io(format!("creating {}", dir.display()), e))
}
