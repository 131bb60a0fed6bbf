//! Action reference resolution
//!
//! Splits a `uses`-style reference into a remote location, a version
//! selector and an optional subpath, and qualifies the selector into the
//! branch or tag namespace.

pub mod parse;
pub mod qualify;

pub use parse::{parse_action_name, resolve, ActionName, ResolvedReference};
pub use qualify::{invert, is_commit_hash, is_qualified, qualify};
