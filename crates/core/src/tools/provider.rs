//! Collaborator traits for resolving, installing, and caching a tool.
//!
//! The installer never talks to npm or the filesystem cache directly. It
//! drives these traits, which lets the provider crates plug in real backends
//! and lets tests count calls on mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Result;

/// CPU architecture.
///
/// Displayed the way CI runner tool caches name their arch directories
/// (`x64`, `arm64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 64-bit ARM (`aarch64`).
    Arm64,
    /// 64-bit x86 (`x86_64`).
    X64,
}

impl Arch {
    /// Get the current architecture.
    #[must_use]
    pub fn current() -> Self {
        #[cfg(target_arch = "aarch64")]
        return Self::Arm64;
        #[cfg(target_arch = "x86_64")]
        return Self::X64;
        #[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
        compile_error!("Unsupported architecture");
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arm64 => write!(f, "arm64"),
            Self::X64 => write!(f, "x64"),
        }
    }
}

/// Key of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Fixed tool name (e.g., "firebase-tools").
    pub tool: String,
    /// Concrete resolved version, never "latest".
    pub version: String,
    /// Architecture of the installed files.
    pub arch: Arch,
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} ({})", self.tool, self.version, self.arch)
    }
}

/// Everything the package manager needs to install one package version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Package name in the registry.
    pub package: String,
    /// Exact version to install.
    pub version: String,
    /// Directory the install runs in and populates.
    pub working_dir: PathBuf,
}

impl InstallRequest {
    /// The `name@version` spec passed to the package manager.
    #[must_use]
    pub fn package_spec(&self) -> String {
        format!("{}@{}", self.package, self.version)
    }
}

/// Source of "current version" answers for a package.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Registry backend name (e.g., "npm", "http").
    fn name(&self) -> &'static str;

    /// Query the latest published version of `package`.
    ///
    /// Implementations return the raw answer; the resolver trims it.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the query fails.
    async fn latest_version(&self, package: &str) -> Result<String>;

    /// Check if the backend's prerequisites are available.
    ///
    /// # Errors
    ///
    /// Returns an error with a helpful message if prerequisites are not met.
    async fn check_prerequisites(&self) -> Result<()> {
        Ok(())
    }
}

/// Installs a package version into a working directory.
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Package manager name (e.g., "npm").
    fn name(&self) -> &'static str;

    /// Install `request.package_spec()` into `request.working_dir`.
    ///
    /// # Errors
    ///
    /// Returns an installation error if the package manager fails.
    async fn install(&self, request: &InstallRequest) -> Result<()>;

    /// Check if the package manager is available.
    ///
    /// # Errors
    ///
    /// Returns an error with a helpful message if prerequisites are not met.
    async fn check_prerequisites(&self) -> Result<()> {
        Ok(())
    }
}

/// Persistent store of installed tool directories.
///
/// Content addressing, eviction, and cross-invocation locking belong to the
/// store, not to the installer.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up the directory cached under `key`.
    ///
    /// # Errors
    ///
    /// Returns a cache store error if the lookup itself fails.
    async fn find(&self, key: &CacheKey) -> Result<Option<PathBuf>>;

    /// Persist `source_dir` under `key`, returning the canonical path.
    ///
    /// The store may copy or relocate the files; callers must use the
    /// returned path afterwards.
    ///
    /// # Errors
    ///
    /// Returns a cache store error if the store rejects the entry.
    async fn store(&self, source_dir: &Path, key: &CacheKey) -> Result<PathBuf>;
}

/// Where a package manager puts executable shims inside an install root.
pub trait ExecutableLayout: Send + Sync {
    /// Locate the executable directory for an install root.
    fn bin_dir(&self, install_root: &Path) -> PathBuf;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_display_matches_runner_dirs() {
        assert_eq!(Arch::X64.to_string(), "x64");
        assert_eq!(Arch::Arm64.to_string(), "arm64");
    }

    #[test]
    fn test_cache_key_display() {
        let key = CacheKey {
            tool: "firebase-tools".into(),
            version: "10.0.2".into(),
            arch: Arch::X64,
        };
        assert_eq!(key.to_string(), "firebase-tools@10.0.2 (x64)");
    }

    #[test]
    fn test_install_request_package_spec() {
        let request = InstallRequest {
            package: "firebase-tools".into(),
            version: "9.1.0".into(),
            working_dir: PathBuf::from("/tmp/work"),
        };
        assert_eq!(request.package_spec(), "firebase-tools@9.1.0");
    }
}
