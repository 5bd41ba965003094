//! Runner-style tool cache on the local filesystem.
//!
//! Structure (compatible with the hosted runner tool cache):
//! ```text
//! <root>/
//! └── firebase-tools/
//!     └── 10.0.2/
//!         ├── x64/             # Installed tree (node_modules/...)
//!         └── x64.complete     # Written last; entries without it are misses
//! ```

use async_trait::async_trait;
use setup_firebase_core::tools::{Arch, CacheKey, CacheStore};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::{Error, Result};

/// Filesystem tool cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    /// Create a cache at the specified root directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the installed tree for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool or version cannot be a path component.
    pub fn entry_dir(&self, key: &CacheKey) -> Result<PathBuf> {
        validate_component("tool", &key.tool)?;
        validate_component("version", &key.version)?;
        Ok(self
            .root
            .join(&key.tool)
            .join(&key.version)
            .join(key.arch.to_string()))
    }

    /// Completion marker written after `entry_dir` is fully populated.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool or version cannot be a path component.
    pub fn marker_path(&self, key: &CacheKey) -> Result<PathBuf> {
        let entry = self.entry_dir(key)?;
        Ok(entry.with_file_name(format!("{}.complete", key.arch)))
    }

    /// Look up a complete entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid.
    pub fn lookup(&self, key: &CacheKey) -> Result<Option<PathBuf>> {
        let entry = self.entry_dir(key)?;
        let marker = self.marker_path(key)?;
        if entry.is_dir() && marker.is_file() {
            trace!(%key, path = %entry.display(), "Cache hit");
            Ok(Some(entry))
        } else {
            if entry.exists() {
                debug!(%key, "Ignoring incomplete cache entry");
            } else {
                trace!(%key, "Cache miss");
            }
            Ok(None)
        }
    }

    /// Copy `source` into the cache under `key` and mark it complete.
    ///
    /// The tree is copied into a staging dir next to the entry and renamed
    /// into place, so a failed copy never leaves a half-filled entry behind.
    /// An existing entry for the same key is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, `source` is not a directory,
    /// or any filesystem step fails.
    pub fn save(&self, source: &Path, key: &CacheKey) -> Result<PathBuf> {
        let entry = self.entry_dir(key)?;
        let marker = self.marker_path(key)?;
        if !source.is_dir() {
            return Err(Error::io(
                std::io::Error::new(std::io::ErrorKind::NotFound, "source is not a directory"),
                source,
                "read source",
            ));
        }

        let version_dir = entry
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        fs::create_dir_all(&version_dir).map_err(|e| Error::io(e, &version_dir, "create_dir_all"))?;

        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}.staging-", key.arch))
            .tempdir_in(&version_dir)
            .map_err(|e| Error::io(e, &version_dir, "create staging dir"))?;
        copy_tree(source, staging.path())?;

        remove_if_exists(&marker)?;
        let staged = staging.keep();
        if entry.exists() {
            warn!(%key, "Replacing existing cache entry");
            retire(&entry, &staged);
        }

        if let Err(e) = fs::rename(&staged, &entry) {
            let _ = fs::remove_dir_all(&staged);
            // Entries only ever appear by renaming a finished copy, so a dir
            // here means a concurrent save of the same key got in first.
            if !entry.is_dir() {
                return Err(Error::io(e, &entry, "rename"));
            }
            warn!(%key, error = %e, "Concurrent save won, keeping its entry");
        }
        fs::write(&marker, b"").map_err(|e| Error::io(e, &marker, "write"))?;

        debug!(%key, path = %entry.display(), "Stored tool in cache");
        Ok(entry)
    }

    /// Versions of `tool` with a complete entry for `arch`.
    ///
    /// Semantic versions sort by precedence and come first; anything else
    /// follows in string order.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool name is invalid or its directory cannot
    /// be read.
    pub fn versions(&self, tool: &str, arch: Arch) -> Result<Vec<String>> {
        validate_component("tool", tool)?;
        let tool_dir = self.root.join(tool);
        if !tool_dir.is_dir() {
            return Ok(Vec::new());
        }

        let marker_name = format!("{arch}.complete");
        let mut versions: Vec<String> = fs::read_dir(&tool_dir)
            .map_err(|e| Error::io(e, &tool_dir, "read_dir"))?
            .filter_map(|entry| {
                entry
                    .map_err(|e| {
                        debug!(dir = %tool_dir.display(), error = %e, "Skipping unreadable entry");
                    })
                    .ok()
            })
            .filter(|entry| entry.path().join(&marker_name).is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();

        versions.sort_by(|a, b| {
            match (semver::Version::parse(a), semver::Version::parse(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                (Err(_), Err(_)) => a.cmp(b),
            }
        });
        Ok(versions)
    }
}

#[async_trait]
impl CacheStore for ToolCache {
    async fn find(&self, key: &CacheKey) -> setup_firebase_core::Result<Option<PathBuf>> {
        Ok(self.lookup(key)?)
    }

    async fn store(&self, source_dir: &Path, key: &CacheKey) -> setup_firebase_core::Result<PathBuf> {
        let cache = self.clone();
        let source = source_dir.to_path_buf();
        let key = key.clone();
        let stored = tokio::task::spawn_blocking(move || cache.save(&source, &key))
            .await
            .map_err(|e| setup_firebase_core::Error::cache_store(format!("copy task failed: {e}")))??;
        Ok(stored)
    }
}

/// Reject values that would escape or restructure the cache layout.
fn validate_component(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_key(field, value, "must not be empty"));
    }
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == value => Ok(()),
        _ => Err(Error::invalid_key(
            field,
            value,
            "must be a single path component",
        )),
    }
}

/// Move an existing entry aside, then delete it.
///
/// The rename is atomic, so readers see either the old tree or nothing.
/// The aside name is derived from the caller's unique staging dir.
fn retire(entry: &Path, staged: &Path) {
    let mut name = staged.file_name().unwrap_or_default().to_os_string();
    name.push(".old");
    let aside = staged.with_file_name(name);

    match fs::rename(entry, &aside) {
        Ok(()) => {
            if let Err(e) = fs::remove_dir_all(&aside) {
                warn!(path = %aside.display(), error = %e, "Failed to remove replaced cache entry");
            }
        }
        // Already moved by a concurrent save
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            debug!(path = %entry.display(), error = %e, "Could not move old entry aside");
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(e, path, "remove_file")),
    }
}

/// Recursively copy `src` into the existing directory `dst`.
///
/// Symlinks are recreated rather than followed: npm's `.bin` shims are
/// relative links into the package tree.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false).min_depth(1) {
        let entry = entry.map_err(|e| Error::Walk {
            path: src.into(),
            message: e.to_string(),
        })?;
        let rel = entry.path().strip_prefix(src).map_err(|_| Error::Walk {
            path: src.into(),
            message: format!("{} is outside the walk root", entry.path().display()),
        })?;
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(e, &target, "create_dir_all"))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(e, &target, "copy"))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let points_to = fs::read_link(link).map_err(|e| Error::io(e, link, "read_link"))?;
    std::os::unix::fs::symlink(&points_to, target).map_err(|e| Error::io(e, target, "symlink"))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    fs::copy(link, target)
        .map(|_| ())
        .map_err(|e| Error::io(e, target, "copy"))
}
