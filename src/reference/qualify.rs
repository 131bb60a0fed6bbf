//! Version selector qualification
//!
//! Turns a short selector like `v2` or `main` into a fully-qualified ref
//! path. Whether a name is a branch or a tag cannot be known without asking
//! the remote, so this guesses from the shape of the name and the fetcher
//! corrects a wrong guess (see [`invert`]).

use regex::Regex;
use std::sync::LazyLock;

/// Prefix shared by all fully-qualified references
pub const REFS_PREFIX: &str = "refs/";

/// Branch namespace
pub const HEADS_PREFIX: &str = "refs/heads/";

/// Tag namespace
pub const TAGS_PREFIX: &str = "refs/tags/";

static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?((([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?(?:-([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?)(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?)$",
    )
    .expect("semver pattern is valid")
});

static SHA1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-f0-9]{40}$").expect("sha1 pattern is valid"));

static SHA256: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-f0-9]{64}$").expect("sha256 pattern is valid"));

/// Whether the selector is already a full `refs/...` path
pub fn is_qualified(name: &str) -> bool {
    name.starts_with(REFS_PREFIX)
}

/// Whether the selector looks like a semantic version (`v1`, `1.2.3-rc.1+b5`)
pub fn is_version_like(name: &str) -> bool {
    SEMVER.is_match(name)
}

/// Whether the string is a full SHA-1 or SHA-256 commit hash
pub fn is_commit_hash(s: &str) -> bool {
    SHA1.is_match(s) || SHA256.is_match(s)
}

/// Expand a selector to its fully-qualified reference path.
///
/// Qualified names pass through, version-like names become tags and
/// everything else becomes a branch. An empty selector stays empty and
/// means the remote's default branch.
pub fn qualify(name: &str) -> String {
    if name.is_empty() || is_qualified(name) {
        return name.to_string();
    }
    if is_version_like(name) {
        return format!("{TAGS_PREFIX}{name}");
    }
    format!("{HEADS_PREFIX}{name}")
}

/// Swap the branch/tag guess for `name`.
///
/// Returns `None` when `qualified` is in neither namespace, or when the
/// caller asked for a qualified ref explicitly (there is no guess to undo).
pub fn invert(qualified: &str, name: &str) -> Option<String> {
    if name.is_empty() || is_qualified(name) {
        return None;
    }
    if qualified.starts_with(HEADS_PREFIX) {
        Some(format!("{TAGS_PREFIX}{name}"))
    } else if qualified.starts_with(TAGS_PREFIX) {
        Some(format!("{HEADS_PREFIX}{name}"))
    } else {
        None
    }
}
