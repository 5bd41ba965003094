//! Executable search path as an explicit value.
//!
//! The installer never mutates the process environment. It returns a
//! [`SearchPath`] that callers apply to the commands they spawn, or hand to a
//! [`PathExporter`] so later pipeline steps pick the directory up.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::{Error, Result};

/// Ordered list of directories searched for executables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
}

impl SearchPath {
    /// Create an empty search path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a `PATH`-style value into entries.
    #[must_use]
    pub fn from_os_value(value: &std::ffi::OsStr) -> Self {
        Self {
            entries: std::env::split_paths(value).collect(),
        }
    }

    /// Snapshot the current process `PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var_os("PATH")
            .map(|value| Self::from_os_value(&value))
            .unwrap_or_default()
    }

    /// Put `dir` first. An existing occurrence is moved to the front rather
    /// than duplicated.
    pub fn prepend(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        self.entries.retain(|entry| entry != &dir);
        self.entries.insert(0, dir);
    }

    /// Entries in search order.
    #[must_use]
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// First entry, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Path> {
        self.entries.first().map(PathBuf::as_path)
    }

    /// Join into a `PATH`-style value.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an entry contains the platform's
    /// path separator.
    pub fn to_os_value(&self) -> Result<OsString> {
        std::env::join_paths(&self.entries).map_err(|e| {
            Error::configuration(format!("search path entry cannot be joined: {e}"))
        })
    }

    /// Set `PATH` on a command about to be spawned.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be joined.
    pub fn apply(&self, command: &mut Command) -> Result<()> {
        command.env("PATH", self.to_os_value()?);
        Ok(())
    }
}

/// Makes an executable directory visible outside the current process.
pub trait PathExporter: Send + Sync {
    /// Export `dir` so subsequently spawned processes or steps can find it.
    ///
    /// # Errors
    ///
    /// Returns an export error if the directory cannot be published.
    fn export(&self, dir: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_value(entries: &[&str]) -> OsString {
        std::env::join_paths(entries).unwrap()
    }

    #[test]
    fn test_prepend_puts_dir_first() {
        let mut path = SearchPath::from_os_value(&path_value(&["/usr/bin", "/bin"]));
        path.prepend("/cache/firebase-tools/9.1.0/x64/node_modules/.bin");

        assert_eq!(
            path.first(),
            Some(Path::new("/cache/firebase-tools/9.1.0/x64/node_modules/.bin"))
        );
        assert_eq!(path.entries().len(), 3);
    }

    #[test]
    fn test_prepend_moves_existing_entry() {
        let mut path = SearchPath::from_os_value(&path_value(&["/usr/bin", "/opt/bin", "/bin"]));
        path.prepend("/opt/bin");

        let entries: Vec<_> = path.entries().iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(entries, vec!["/opt/bin", "/usr/bin", "/bin"]);
    }

    #[test]
    fn test_round_trip_os_value() {
        let value = path_value(&["/a", "/b"]);
        let path = SearchPath::from_os_value(&value);
        assert_eq!(path.to_os_value().unwrap(), value);
    }

    #[test]
    fn test_empty_path() {
        let mut path = SearchPath::new();
        assert!(path.first().is_none());
        path.prepend("/only");
        assert_eq!(path.entries(), &[PathBuf::from("/only")]);
    }

    #[test]
    fn test_from_env_reads_path() {
        temp_env::with_var("PATH", Some(path_value(&["/x", "/y"])), || {
            let path = SearchPath::from_env();
            assert_eq!(path.first(), Some(Path::new("/x")));
        });

        temp_env::with_var_unset("PATH", || {
            assert!(SearchPath::from_env().entries().is_empty());
        });
    }

    #[test]
    fn test_apply_sets_command_env() {
        let mut path = SearchPath::new();
        path.prepend("/tools/bin");

        let mut command = Command::new("firebase");
        path.apply(&mut command).unwrap();

        let envs: Vec<_> = command.as_std().get_envs().collect();
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].0, "PATH");
        assert_eq!(envs[0].1, Some(std::ffi::OsStr::new("/tools/bin")));
    }
}
