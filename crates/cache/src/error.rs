//! Error types for the cache crate

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error during cache operations
    #[error("I/O {operation} failed for {}: {source}", path.display())]
    #[diagnostic(
        code(setup_firebase::cache::io),
        help("Check file permissions and free space in the tool cache")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error
        path: Box<Path>,
        /// Operation that failed (e.g., "read", "copy", "rename")
        operation: String,
    },

    /// A key component cannot be used as a directory name
    #[error("Invalid cache key {field} '{value}': {reason}")]
    #[diagnostic(code(setup_firebase::cache::invalid_key))]
    InvalidKey {
        /// Which component ("tool" or "version")
        field: &'static str,
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Directory walk failed while copying into the cache
    #[error("Failed to walk {}: {message}", path.display())]
    #[diagnostic(code(setup_firebase::cache::walk))]
    Walk {
        /// Root of the walk
        path: Box<Path>,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an I/O error with path context
    #[must_use]
    pub fn io(source: std::io::Error, path: impl AsRef<Path>, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }

    /// Create an invalid key error
    #[must_use]
    pub fn invalid_key(field: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            field,
            value: value.into(),
            reason,
        }
    }
}

impl From<Error> for setup_firebase_core::Error {
    fn from(err: Error) -> Self {
        Self::cache_store(err.to_string())
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;
