//! Error types for tool resolution and installation.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for setup-firebase operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, installing, or caching a tool.
///
/// None of these are recovered locally: the installer performs no retry and
/// no fallback, so every variant ends the current invocation.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The registry could not report a current version.
    #[error("Failed to resolve latest version of '{package}': {message}")]
    #[diagnostic(
        code(setup_firebase::resolution),
        help("Check network access to the npm registry")
    )]
    Resolution {
        /// Package that was queried.
        package: String,
        /// Collaborator failure text.
        message: String,
    },

    /// The package manager failed to install the requested version.
    #[error("Failed to install {package}@{version}: {message}")]
    #[diagnostic(code(setup_firebase::installation))]
    Installation {
        /// Package being installed.
        package: String,
        /// Concrete version being installed.
        version: String,
        /// Collaborator failure text.
        message: String,
    },

    /// The cache store rejected a lookup or persist operation.
    #[error("Cache store error: {0}")]
    #[diagnostic(code(setup_firebase::cache_store))]
    CacheStore(String),

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(setup_firebase::config))]
    Configuration {
        /// What was wrong.
        message: String,
        /// Optional help text.
        #[help]
        help: Option<String>,
    },

    /// Exporting the executable directory to later pipeline steps failed.
    #[error("Failed to export {path}: {message}")]
    #[diagnostic(code(setup_firebase::export))]
    Export {
        /// Directory being exported.
        path: PathBuf,
        /// Reason.
        message: String,
    },

    /// Filesystem operation failed.
    #[error("I/O {operation} failed{}: {source}", path_suffix(.path.as_deref()))]
    #[diagnostic(code(setup_firebase::io))]
    Io {
        /// Underlying error.
        #[source]
        source: std::io::Error,
        /// Path involved, if known.
        path: Option<PathBuf>,
        /// Short description of the operation.
        operation: String,
    },
}

fn path_suffix(path: Option<&Path>) -> String {
    path.map(|p| format!(" for {}", p.display()))
        .unwrap_or_default()
}

impl Error {
    /// Create a resolution error.
    #[must_use]
    pub fn resolution(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Create an installation error.
    #[must_use]
    pub fn installation(
        package: impl Into<String>,
        version: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Installation {
            package: package.into(),
            version: version.into(),
            message: message.into(),
        }
    }

    /// Create a cache store error.
    #[must_use]
    pub fn cache_store(message: impl Into<String>) -> Self {
        Self::CacheStore(message.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text.
    #[must_use]
    pub fn configuration_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an export error.
    #[must_use]
    pub fn export(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Export {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with the path and operation that failed.
    #[must_use]
    pub fn io(source: std::io::Error, path: impl AsRef<Path>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().to_path_buf()),
            operation: operation.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "operation".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_display() {
        let err = Error::resolution("firebase-tools", "npm exited with status 1");
        assert_eq!(
            err.to_string(),
            "Failed to resolve latest version of 'firebase-tools': npm exited with status 1"
        );
    }

    #[test]
    fn test_installation_display() {
        let err = Error::installation("firebase-tools", "9.1.0", "ETARGET");
        assert_eq!(
            err.to_string(),
            "Failed to install firebase-tools@9.1.0: ETARGET"
        );
    }

    #[test]
    fn test_io_display_with_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::io(source, "/tmp/x", "read");
        assert_eq!(err.to_string(), "I/O read failed for /tmp/x: missing");
    }

    #[test]
    fn test_io_from_conversion() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(source);
        assert!(err.to_string().starts_with("I/O operation failed"));
    }

    #[test]
    fn test_configuration_help() {
        let err = Error::configuration_with_help("bad", "fix it");
        match err {
            Error::Configuration { help, .. } => assert_eq!(help.as_deref(), Some("fix it")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
