//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// Environment variables that indicate a CI runner
const CI_VARS: [&str; 9] = [
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
];

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether status output goes to an interactive terminal
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
        }
    }

    /// Create a non-interactive context (for testing or explicit CI mode)
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Check if we should use fancy output (spinners, colors)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    /// Status output is written to stderr, so that is the stream checked.
    /// Stdout may be piped into another command.
    fn detect_interactive() -> bool {
        if !std::io::stderr().is_terminal() {
            return false;
        }

        !CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
    }
}
