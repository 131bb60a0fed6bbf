//! actfetch - fetch and cache workflow actions
//!
//! Resolves `uses`-style action references to git locations, fetches
//! them with bounded retries and keeps each checkout in a persistent,
//! process-safe cache.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod reference;
pub mod ui;

pub use error::{ActfetchError, ActfetchResult};
