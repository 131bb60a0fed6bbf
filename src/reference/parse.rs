//! Action reference parsing
//!
//! A reference is normally `org/repo[/path]@ref`. Anything that does not
//! match that form falls back to being treated as a repository location,
//! optionally followed by `@ref`.

use crate::error::{ActfetchError, ActfetchResult};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static ACTION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^/@]+)/([^/@]+)(/([^@]*))?(@(.*))?$").expect("action name pattern is valid")
});

/// The parts of a strict `org/repo[/path]@ref` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionName {
    pub org: String,
    pub repo: String,
    /// Subdirectory inside the repository (empty for the root)
    pub path: String,
    pub reference: String,
}

/// Where an action lives and which version to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedReference {
    /// Parsed from the strict `org/repo[/path]@ref` form
    Action { url: String, name: ActionName },

    /// Permissive fallback: a location and a possibly empty selector
    Location { url: String, reference: String },
}

impl ResolvedReference {
    /// Remote location to fetch from
    pub fn url(&self) -> &str {
        match self {
            Self::Action { url, .. } | Self::Location { url, .. } => url,
        }
    }

    /// Version selector (empty means the default branch)
    pub fn reference(&self) -> &str {
        match self {
            Self::Action { name, .. } => &name.reference,
            Self::Location { reference, .. } => reference,
        }
    }

    /// Subdirectory of the action inside the repository
    pub fn path(&self) -> &str {
        match self {
            Self::Action { name, .. } => &name.path,
            Self::Location { .. } => "",
        }
    }

    /// Whether the strict form matched
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action { .. })
    }
}

/// Parse the strict `org/repo[/path]@ref` form.
///
/// Org and repo must be non-empty and the ref after `@` is mandatory.
pub fn parse_action_name(action: &str) -> ActfetchResult<ActionName> {
    let captures = ACTION_NAME
        .captures(action)
        .ok_or_else(|| ActfetchError::invalid_reference(action, "expected org/repo[/path]@ref"))?;

    let reference = captures.get(6).map_or("", |m| m.as_str());
    if reference.is_empty() {
        return Err(ActfetchError::invalid_reference(
            action,
            "missing ref after '@'",
        ));
    }

    Ok(ActionName {
        org: captures[1].to_string(),
        repo: captures[2].to_string(),
        path: captures.get(4).map_or("", |m| m.as_str()).to_string(),
        reference: reference.to_string(),
    })
}

/// Resolve a reference string against `default_host`.
///
/// Strict parsing is tried first. On failure the string is joined onto
/// `default_host` (unless it already is a URL) and split once on `@`.
/// Only input that cannot form a URL at all is rejected.
pub fn resolve(reference: &str, default_host: &str) -> ActfetchResult<ResolvedReference> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ActfetchError::invalid_reference(reference, "empty reference"));
    }

    let host = default_host.trim_end_matches('/');

    match parse_action_name(reference) {
        Ok(name) => {
            let url = format!("{}/{}/{}", host, name.org, name.repo);
            debug!("parsed repo: {}, ref: {}", url, name.reference);
            Ok(ResolvedReference::Action { url, name })
        }
        Err(e) => {
            debug!("not an action name, using it as a location: {}: {}", reference, e);

            let joined = if reference.starts_with(host) || reference.contains("://") {
                reference.to_string()
            } else {
                format!("{}/{}", host, reference.trim_start_matches('/'))
            };

            let (url, selector) = match joined.split_once('@') {
                Some((url, selector)) => (url.to_string(), selector.to_string()),
                None => (joined, String::new()),
            };

            Url::parse(&url)
                .map_err(|e| ActfetchError::invalid_reference(reference, e.to_string()))?;

            debug!("parsed repo: {}, ref: {:?}", url, selector);
            Ok(ResolvedReference::Location {
                url,
                reference: selector,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://github.com";

    #[test]
    fn strict_reference_without_path() {
        let name = parse_action_name("octocat/Hello-World@v1").unwrap();
        assert_eq!(
            name,
            ActionName {
                org: "octocat".to_string(),
                repo: "Hello-World".to_string(),
                path: String::new(),
                reference: "v1".to_string(),
            }
        );
    }

    #[test]
    fn strict_reference_with_nested_path() {
        let name = parse_action_name("github/codeql-action/init/sub@v2.1.0").unwrap();
        assert_eq!(name.org, "github");
        assert_eq!(name.repo, "codeql-action");
        assert_eq!(name.path, "init/sub");
        assert_eq!(name.reference, "v2.1.0");
    }

    #[test]
    fn strict_reference_keeps_everything_after_first_at() {
        let name = parse_action_name("org/repo@feature/x").unwrap();
        assert_eq!(name.reference, "feature/x");
    }

    #[test]
    fn strict_parse_rejects_missing_ref() {
        assert!(parse_action_name("actions/checkout").is_err());
        assert!(parse_action_name("actions/checkout@").is_err());
        assert!(parse_action_name("checkout@v2").is_err());
        assert!(parse_action_name("/checkout@v2").is_err());
    }

    #[test]
    fn resolve_strict_builds_host_url() {
        let resolved = resolve("octocat/Hello-World@v1", HOST).unwrap();
        assert!(resolved.is_action());
        assert_eq!(resolved.url(), "https://github.com/octocat/Hello-World");
        assert_eq!(resolved.reference(), "v1");
        assert_eq!(resolved.path(), "");
    }

    #[test]
    fn resolve_without_at_falls_back_with_empty_ref() {
        for input in ["actions/checkout", "just-a-name", "a/b/c/d"] {
            let resolved = resolve(input, HOST).unwrap();
            assert!(!resolved.is_action(), "{input}");
            assert_eq!(resolved.reference(), "", "{input}");
            assert_eq!(resolved.url(), format!("{HOST}/{input}"));
        }
    }

    #[test]
    fn resolve_full_url_is_not_rejoined() {
        let resolved = resolve("https://github.com/actions/checkout@v3", HOST).unwrap();
        assert_eq!(resolved.url(), "https://github.com/actions/checkout");
        assert_eq!(resolved.reference(), "v3");

        let resolved = resolve("https://gitlab.com/group/project", HOST).unwrap();
        assert_eq!(resolved.url(), "https://gitlab.com/group/project");
        assert_eq!(resolved.reference(), "");
    }

    #[test]
    fn resolve_trailing_at_yields_empty_ref() {
        let resolved = resolve("actions/checkout@", HOST).unwrap();
        assert_eq!(resolved.url(), "https://github.com/actions/checkout");
        assert_eq!(resolved.reference(), "");
    }

    #[test]
    fn resolve_honours_custom_host() {
        let resolved = resolve("org/repo@main", "https://git.example.com/").unwrap();
        assert_eq!(resolved.url(), "https://git.example.com/org/repo");
    }

    #[test]
    fn resolve_rejects_empty_input() {
        assert!(matches!(
            resolve("   ", HOST),
            Err(ActfetchError::InvalidReference { .. })
        ));
    }
}
