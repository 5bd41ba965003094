//! GitHub Actions file commands.
//!
//! A step exposes a directory to later steps by appending it to the file
//! named by `GITHUB_PATH`, and sets step outputs by appending `key=value`
//! lines to the file named by `GITHUB_OUTPUT`.

use setup_firebase_core::{Error, PathExporter, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File that collects directories to add to `PATH` for later steps.
pub const GITHUB_PATH_ENV: &str = "GITHUB_PATH";
/// File that collects step outputs.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

fn env_file(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn append_line(file: &Path, line: &str) -> Result<()> {
    let mut handle = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .map_err(|e| Error::io(e, file, "open"))?;
    writeln!(handle, "{line}").map_err(|e| Error::io(e, file, "append"))
}

/// Appends directories to the `GITHUB_PATH` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubPath {
    file: PathBuf,
}

impl GithubPath {
    /// Use an explicit file.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    /// The file named by `GITHUB_PATH`, if set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        env_file(GITHUB_PATH_ENV).map(Self::new)
    }
}

impl PathExporter for GithubPath {
    fn export(&self, dir: &Path) -> Result<()> {
        let line = dir
            .to_str()
            .filter(|s| !s.contains('\n'))
            .ok_or_else(|| Error::export(dir, "path is not a single line of UTF-8"))?;
        debug!(file = %self.file.display(), dir = line, "Exporting to GITHUB_PATH");
        append_line(&self.file, line)
    }
}

/// Appends `key=value` lines to the `GITHUB_OUTPUT` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubOutput {
    file: PathBuf,
}

impl GithubOutput {
    /// Use an explicit file.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    /// The file named by `GITHUB_OUTPUT`, if set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        env_file(GITHUB_OUTPUT_ENV).map(Self::new)
    }

    /// Set one output.
    ///
    /// # Errors
    ///
    /// Returns an export error for multi-line values, or an I/O error if
    /// the file cannot be appended to.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if value.contains('\n') {
            return Err(Error::export(
                &self.file,
                format!("output '{key}' must be a single line"),
            ));
        }
        append_line(&self.file, &format!("{key}={value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_github_path_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("path.txt");
        fs::write(&file, "/existing\n").unwrap();

        let exporter = GithubPath::new(&file);
        exporter.export(Path::new("/cache/firebase-tools/9.1.0/x64/node_modules/.bin")).unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "/existing\n/cache/firebase-tools/9.1.0/x64/node_modules/.bin\n"
        );
    }

    #[test]
    fn test_github_output_lines() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("output.txt");

        let output = GithubOutput::new(&file);
        output.set("version", "10.0.2").unwrap();
        output.set("cache-hit", "true").unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "version=10.0.2\ncache-hit=true\n"
        );
    }

    #[test]
    fn test_github_output_rejects_multiline() {
        let dir = tempfile::tempdir().unwrap();
        let output = GithubOutput::new(dir.path().join("output.txt"));
        let err = output.set("path", "a\nb").unwrap_err();
        assert!(matches!(err, Error::Export { .. }));
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                (GITHUB_PATH_ENV, Some("/runner/path")),
                (GITHUB_OUTPUT_ENV, Some("")),
            ],
            || {
                assert_eq!(GithubPath::from_env(), Some(GithubPath::new("/runner/path")));
                assert_eq!(GithubOutput::from_env(), None);
            },
        );
    }
}
