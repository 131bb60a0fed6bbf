//! Error types for actfetch
//!
//! All modules use `ActfetchResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for actfetch operations
pub type ActfetchResult<T> = Result<T, ActfetchError>;

/// All errors that can occur in actfetch
#[derive(Error, Debug)]
pub enum ActfetchError {
    // Reference errors
    #[error("Invalid action reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    // Fetch errors
    #[error("Failed to fetch {reference} from {url}: {reason}")]
    Transport {
        url: String,
        reference: String,
        reason: String,
    },

    #[error("Reference {reference} not found in {url}")]
    ReferenceNotFound { url: String, reference: String },

    #[error("Failed to check out commit {sha}: {reason}")]
    Checkout { sha: String, reason: String },

    #[error("Fetch from {url} was cancelled")]
    Cancelled { url: String },

    // Cache errors
    #[error("Failed to take cache lock {path}: {source}")]
    CacheLock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to add item {key} to cache: {source}")]
    CachePopulate {
        key: String,
        #[source]
        source: Box<ActfetchError>,
    },

    #[error("Failed to create completion marker {path}: {source}")]
    CacheMarker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ActfetchError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create an invalid reference error
    pub fn invalid_reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// Only transport failures are transient. A missing reference, a bad
    /// commit pin or a lock failure will not go away by trying again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Check if the remote reported that the requested ref does not exist
    pub fn is_reference_not_found(&self) -> bool {
        match self {
            Self::ReferenceNotFound { .. } => true,
            Self::CachePopulate { source, .. } => source.is_reference_not_found(),
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => Some("Make sure git is installed and on PATH"),
            Self::ReferenceNotFound { .. } => {
                Some("Check that the branch or tag exists, or pass a full refs/... name")
            }
            Self::Transport { .. } => {
                Some("Check network access and that GITHUB_TOKEN is set for private repositories")
            }
            Self::Checkout { .. } => Some("The commit must be reachable from the requested ref"),
            Self::CachePopulate { source, .. } => source.hint(),
            _ => None,
        }
    }
}
