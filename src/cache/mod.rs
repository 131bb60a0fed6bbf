//! Persistent keyed cache for fetched sources
//!
//! Maps an arbitrary key to a directory under the cache root and runs the
//! work that fills it at most once.
//!
//! # Cache States
//!
//! | State | On disk | Description |
//! |-------|---------|-------------|
//! | Miss | nothing | Never attempted |
//! | Building | dir, no `.done` | In progress or interrupted, retryable |
//! | Complete | `.done` present | Finalized, never mutated again |
//!
//! Population runs under an exclusive file lock, so concurrent callers,
//! including other processes, wait and then observe the marker instead of
//! repeating the work. Nothing here deletes an entry.

pub mod entry;
pub mod lock;
pub mod store;

pub use entry::{key_digest, CacheEntry, CacheState};
pub use lock::EntryLock;
pub use store::Cache;
