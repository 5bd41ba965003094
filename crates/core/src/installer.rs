//! Cache-aware installation of a resolved tool version.
//!
//! Per call the installer moves through
//! `Resolving -> CacheHit` or `Resolving -> CacheMiss -> Installing -> Caching`,
//! then computes the executable directory. Any failing step returns the
//! error as-is; nothing is retried and a failed install never reaches the
//! cache store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_TOOL;
use crate::paths;
use crate::search_path::SearchPath;
use crate::tools::{Arch, CacheKey, CacheStore, ExecutableLayout, InstallRequest, PackageManager};
use crate::version::{ResolvedVersion, VersionResolver, VersionSpec};
use crate::{Error, Result};

/// Outcome of [`Installer::get_tool_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPath {
    /// Concrete version that was installed or reused.
    pub version: ResolvedVersion,
    /// Cache entry directory holding the installed package.
    pub install_root: PathBuf,
    /// Directory containing the tool's executables.
    pub bin_dir: PathBuf,
    /// Whether the entry already existed before this call.
    pub cache_hit: bool,
    /// Base search path with `bin_dir` prepended.
    pub search_path: SearchPath,
}

/// Resolves a version, then finds or installs-and-caches it.
pub struct Installer {
    tool: String,
    arch: Arch,
    temp_dir: PathBuf,
    base_path: SearchPath,
    resolver: VersionResolver,
    package_manager: Arc<dyn PackageManager>,
    cache: Arc<dyn CacheStore>,
    layout: Arc<dyn ExecutableLayout>,
}

impl Installer {
    /// Create an installer for the default tool on the current architecture.
    ///
    /// Temporary installs go to the system temp dir and the base search path
    /// is a snapshot of this process's `PATH`; both can be overridden.
    #[must_use]
    pub fn new(
        resolver: VersionResolver,
        package_manager: Arc<dyn PackageManager>,
        cache: Arc<dyn CacheStore>,
        layout: Arc<dyn ExecutableLayout>,
    ) -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            arch: Arch::current(),
            temp_dir: paths::default_temp_dir(),
            base_path: SearchPath::from_env(),
            resolver,
            package_manager,
            cache,
            layout,
        }
    }

    /// Set the tool name used for cache keys.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Set the architecture component of cache keys.
    #[must_use]
    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }

    /// Set the base directory for temporary installs.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Set the search path the executable directory is prepended to.
    #[must_use]
    pub fn with_search_path(mut self, path: SearchPath) -> Self {
        self.base_path = path;
        self
    }

    /// Cache key for a resolved version.
    #[must_use]
    pub fn cache_key(&self, version: &ResolvedVersion) -> CacheKey {
        CacheKey {
            tool: self.tool.clone(),
            version: version.to_string(),
            arch: self.arch,
        }
    }

    /// Resolve `spec`, make sure that version is cached, and return its
    /// executable directory.
    ///
    /// # Errors
    ///
    /// Returns the resolution, installation, or cache store error of the
    /// first step that fails.
    pub async fn get_tool_path(&self, spec: &VersionSpec) -> Result<ToolPath> {
        let version = self.resolver.resolve(spec).await?;
        info!(tool = %self.tool, %version, requested = %spec, "Resolved version");

        let key = self.cache_key(&version);
        let (install_root, cache_hit) = match self.cache.find(&key).await? {
            Some(path) => {
                info!(%key, path = %path.display(), "Using cached install");
                (path, true)
            }
            None => {
                info!(%key, "Not cached, installing");
                (self.install_and_cache(&version, &key).await?, false)
            }
        };

        let bin_dir = self.layout.bin_dir(&install_root);
        let mut search_path = self.base_path.clone();
        search_path.prepend(&bin_dir);
        debug!(bin_dir = %bin_dir.display(), "Prepended executable directory");

        Ok(ToolPath {
            version,
            install_root,
            bin_dir,
            cache_hit,
            search_path,
        })
    }

    async fn install_and_cache(&self, version: &ResolvedVersion, key: &CacheKey) -> Result<PathBuf> {
        let scratch = self.scratch_dir(version);
        tokio::fs::create_dir_all(&self.temp_dir)
            .await
            .map_err(|e| Error::io(e, &self.temp_dir, "create temp base"))?;
        // create_dir (not _all) so a name collision fails instead of sharing a dir
        tokio::fs::create_dir(&scratch)
            .await
            .map_err(|e| Error::io(e, &scratch, "create install dir"))?;

        let request = InstallRequest {
            package: self.resolver.package().to_string(),
            version: version.to_string(),
            working_dir: scratch.clone(),
        };
        info!(
            package = %request.package_spec(),
            dir = %scratch.display(),
            manager = self.package_manager.name(),
            "Installing"
        );

        if let Err(e) = self.package_manager.install(&request).await {
            remove_scratch(&scratch).await;
            return Err(e);
        }

        let stored = match self.cache.store(&scratch, key).await {
            Ok(path) => path,
            Err(e) => {
                remove_scratch(&scratch).await;
                return Err(e);
            }
        };
        info!(%key, path = %stored.display(), "Cached install");

        if stored != scratch {
            remove_scratch(&scratch).await;
        }
        Ok(stored)
    }

    /// A per-attempt directory under the temp base.
    ///
    /// Named from tool, version, a millisecond timestamp, and a random
    /// suffix. Characters outside `[A-Za-z0-9._-]` in the version become `_`.
    fn scratch_dir(&self, version: &ResolvedVersion) -> PathBuf {
        let safe_version: String = version
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        self.temp_dir.join(format!(
            "{}-{}-{}-{}",
            self.tool,
            safe_version,
            millis,
            &suffix[..8]
        ))
    }
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("tool", &self.tool)
            .field("arch", &self.arch)
            .field("temp_dir", &self.temp_dir)
            .field("resolver", &self.resolver)
            .field("package_manager", &self.package_manager.name())
            .finish_non_exhaustive()
    }
}

async fn remove_scratch(path: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove temporary install dir");
    }
}
