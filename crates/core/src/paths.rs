//! Directory locations for the tool cache and install scratch space.
//!
//! | Purpose | CI runner | Elsewhere |
//! |---------|-----------|-----------|
//! | Tool cache | `$RUNNER_TOOL_CACHE` | `~/.cache/setup-firebase/tools` (platform cache dir) |
//! | Temp installs | `$RUNNER_TEMP` | system temp dir |

use std::path::PathBuf;

use crate::{Error, Result};

/// Environment variable naming the runner's shared tool cache.
pub const TOOL_CACHE_ENV: &str = "RUNNER_TOOL_CACHE";

/// Environment variable naming the runner's per-job temp directory.
pub const TEMP_ENV: &str = "RUNNER_TEMP";

fn non_empty_env(name: &str) -> Option<PathBuf> {
    match std::env::var_os(name) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

/// The runner-provided tool cache root, if set.
#[must_use]
pub fn runner_tool_cache() -> Option<PathBuf> {
    non_empty_env(TOOL_CACHE_ENV)
}

/// The runner-provided temp directory, if set.
#[must_use]
pub fn runner_temp() -> Option<PathBuf> {
    non_empty_env(TEMP_ENV)
}

/// Get the default tool cache directory outside CI.
///
/// # Errors
///
/// Returns an error if the platform cache directory cannot be determined.
pub fn default_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().ok_or_else(|| {
        Error::configuration_with_help(
            "Could not determine cache directory",
            format!("Set {TOOL_CACHE_ENV} or pass --cache-dir"),
        )
    })?;
    Ok(base.join("setup-firebase").join("tools"))
}

/// Get the default base directory for temporary installs outside CI.
#[must_use]
pub fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}
