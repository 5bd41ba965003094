//! Version specifiers and their resolution to concrete versions.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::tools::PackageRegistry;
use crate::{Error, Result};

/// Sentinel specifier asking for the registry's current version.
pub const LATEST: &str = "latest";

/// A user-supplied version request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VersionSpec {
    /// Whatever the registry reports as current.
    #[default]
    Latest,
    /// A literal version token, passed through untouched.
    Exact(String),
}

impl VersionSpec {
    /// Parse a specifier.
    ///
    /// Only the exact string `latest` is the sentinel. Any other token,
    /// well-formed or not, is an exact version; the package manager rejects
    /// bad ones downstream.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == LATEST {
            Self::Latest
        } else {
            Self::Exact(s.to_string())
        }
    }

    /// Whether this is the `latest` sentinel.
    #[must_use]
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl From<&str> for VersionSpec {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Exact(v) => f.write_str(v),
        }
    }
}

/// A concrete version, safe to use as a cache key.
///
/// Only [`VersionResolver::resolve`] constructs these, so a `ResolvedVersion`
/// is never the `latest` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedVersion(String);

impl ResolvedVersion {
    /// The version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResolvedVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Turns a [`VersionSpec`] into a [`ResolvedVersion`].
#[derive(Clone)]
pub struct VersionResolver {
    package: String,
    registry: Arc<dyn PackageRegistry>,
}

impl VersionResolver {
    /// Create a resolver for `package` backed by `registry`.
    #[must_use]
    pub fn new(package: impl Into<String>, registry: Arc<dyn PackageRegistry>) -> Self {
        Self {
            package: package.into(),
            registry,
        }
    }

    /// Package whose versions this resolver answers for.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Resolve a specifier.
    ///
    /// Exact specifiers come back unchanged without touching the registry.
    /// `latest` issues exactly one registry query.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the registry query fails or yields an
    /// empty (or `latest`) answer.
    pub async fn resolve(&self, spec: &VersionSpec) -> Result<ResolvedVersion> {
        match spec {
            VersionSpec::Exact(version) if version != LATEST => {
                Ok(ResolvedVersion(version.clone()))
            }
            // `Exact("latest")` can only be built by hand; treat it as the sentinel.
            VersionSpec::Latest | VersionSpec::Exact(_) => {
                debug!(
                    package = %self.package,
                    registry = self.registry.name(),
                    "Querying registry for latest version"
                );
                let raw = self.registry.latest_version(&self.package).await?;
                let version = raw.trim();
                if version.is_empty() || version == LATEST {
                    return Err(Error::resolution(
                        &self.package,
                        format!("registry returned no usable version ({raw:?})"),
                    ));
                }
                Ok(ResolvedVersion(version.to_string()))
            }
        }
    }
}

impl fmt::Debug for VersionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionResolver")
            .field("package", &self.package)
            .field("registry", &self.registry.name())
            .finish()
    }
}
