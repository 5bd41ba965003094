//! Directory-backed tool cache for setup-firebase
//!
//! This crate provides the [`CacheStore`](setup_firebase_core::tools::CacheStore)
//! the binary uses by default:
//! - Entries laid out as `<root>/<tool>/<version>/<arch>`, the same layout
//!   hosted CI runners use for `RUNNER_TOOL_CACHE`
//! - A `<arch>.complete` marker written last, so interrupted copies are
//!   treated as misses
//! - Staged copy plus rename when persisting an install
//!
//! Eviction is out of scope: entries live as long as the runner's cache.

mod error;
mod tool_cache;

pub use error::{Error, Result};
pub use tool_cache::ToolCache;
