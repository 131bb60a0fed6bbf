//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// actfetch - fetch and cache workflow actions
///
/// Resolves `uses`-style action references, clones them with git and
/// keeps each (location, ref, commit) in a local cache.
#[derive(Parser, Debug)]
#[command(name = "actfetch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ACTFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root directory
    #[arg(long, global = true, env = "ACTFETCH_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch an action into the cache and print its directory
    Fetch(FetchArgs),

    /// Show how a reference resolves, without network access
    Resolve(ResolveArgs),

    /// Inspect the action cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Action reference, e.g. `actions/checkout@v4`
    pub reference: String,

    /// Check out this exact commit after fetching
    #[arg(long)]
    pub sha: Option<String>,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Action reference to resolve
    pub reference: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for listings
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cache entries
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the cache entry for a reference
    Info {
        /// Action reference
        reference: String,

        /// Commit the entry was pinned to
        #[arg(long)]
        sha: Option<String>,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Dotted key, e.g. `fetch.depth`
        key: String,

        /// Value to set
        value: String,
    },
}
