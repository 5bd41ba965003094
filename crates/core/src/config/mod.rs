//! Configuration types for setup-firebase
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! runner environment variables, then command-line flags (applied by the
//! binary on top of what [`Config::load`] returns).

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::{Error, Result, paths};

/// Tool name used as the cache key namespace.
pub const DEFAULT_TOOL: &str = "firebase-tools";

/// npm package installed for the tool.
pub const DEFAULT_PACKAGE: &str = "firebase-tools";

/// Public npm registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Where npm places executable shims, relative to the install root.
pub const DEFAULT_BIN_SUBDIR: &str = "node_modules/.bin";

/// Environment variable npm itself honours for the registry URL.
pub const REGISTRY_ENV: &str = "NPM_CONFIG_REGISTRY";

/// Main configuration structure for setup-firebase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    /// Cache key namespace.
    pub tool: String,

    /// Registry package name.
    pub package: String,

    /// How `latest` is resolved.
    pub resolver: ResolverBackend,

    /// Registry base URL for the HTTP resolver.
    pub registry_url: String,

    /// Shim directory relative to the install root.
    pub bin_subdir: PathBuf,

    /// Tool cache root. Falls back to `RUNNER_TOOL_CACHE`, then the platform
    /// cache dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Base directory for temporary installs. Falls back to `RUNNER_TEMP`,
    /// then the system temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            package: DEFAULT_PACKAGE.to_string(),
            resolver: ResolverBackend::default(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            bin_subdir: PathBuf::from(DEFAULT_BIN_SUBDIR),
            cache_dir: None,
            temp_dir: None,
        }
    }
}

/// Backend used to ask the registry for the current version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolverBackend {
    /// `npm view <package> version`
    #[default]
    Npm,
    /// `GET <registry>/<package>/latest`
    Http,
}

impl std::fmt::Display for ResolverBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Npm => write!(f, "npm"),
            Self::Http => write!(f, "http"),
        }
    }
}

impl Config {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid TOML or unknown keys.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::configuration(e.to_string()))
    }

    /// Read a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a configuration
    /// error if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        Self::from_toml(&source).map_err(|e| match e {
            Error::Configuration { message, .. } => Error::configuration_with_help(
                format!("{}: {message}", path.display()),
                "Valid keys: tool, package, resolver, registryUrl, binSubdir, cacheDir, tempDir",
            ),
            other => other,
        })
    }

    /// Build the effective configuration: defaults, then `path` if given,
    /// then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Override fields from `RUNNER_TOOL_CACHE`, `RUNNER_TEMP`, and
    /// `NPM_CONFIG_REGISTRY` when they are set and non-empty.
    pub fn apply_env(&mut self) {
        if let Some(dir) = paths::runner_tool_cache() {
            self.cache_dir = Some(dir);
        }
        if let Some(dir) = paths::runner_temp() {
            self.temp_dir = Some(dir);
        }
        if let Ok(url) = std::env::var(REGISTRY_ENV)
            && !url.is_empty()
        {
            self.registry_url = url;
        }
    }

    /// Effective tool cache root.
    ///
    /// # Errors
    ///
    /// Returns an error if no cache dir is configured and the platform cache
    /// dir cannot be determined.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::default_cache_dir(),
        }
    }

    /// Effective base directory for temporary installs.
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(paths::default_temp_dir)
    }

    /// Check values that the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on blank names or an absolute
    /// `binSubdir`.
    pub fn validate(&self) -> Result<()> {
        if self.tool.trim().is_empty() {
            return Err(Error::configuration("tool name must not be empty"));
        }
        if self.package.trim().is_empty() {
            return Err(Error::configuration("package name must not be empty"));
        }
        let escapes = self
            .bin_subdir
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if self.bin_subdir.is_absolute() || escapes {
            return Err(Error::configuration_with_help(
                format!(
                    "binSubdir must stay inside the install root, got {}",
                    self.bin_subdir.display()
                ),
                "Use a path relative to the install root, e.g. node_modules/.bin",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_KEYS: [&str; 3] = [paths::TOOL_CACHE_ENV, paths::TEMP_ENV, REGISTRY_ENV];

    fn without_env<F: FnOnce()>(f: F) {
        temp_env::with_vars_unset(ENV_KEYS, f);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tool, "firebase-tools");
        assert_eq!(config.package, "firebase-tools");
        assert_eq!(config.resolver, ResolverBackend::Npm);
        assert_eq!(config.bin_subdir, PathBuf::from("node_modules/.bin"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            resolver = "http"
            registryUrl = "https://npm.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.resolver, ResolverBackend::Http);
        assert_eq!(config.registry_url, "https://npm.example.com");
        assert_eq!(config.package, DEFAULT_PACKAGE);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml("vesion = \"1\"").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_load_file_then_env() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("setup-firebase.toml");
        std::fs::write(&file, "cacheDir = \"/from/file\"\ntempDir = \"/tmp/file\"\n").unwrap();

        without_env(|| {
            let config = Config::load(Some(&file)).unwrap();
            assert_eq!(config.cache_dir.as_deref(), Some(Path::new("/from/file")));
        });

        temp_env::with_vars(
            [
                (paths::TOOL_CACHE_ENV, Some("/opt/hostedtoolcache")),
                (paths::TEMP_ENV, None),
                (REGISTRY_ENV, Some("https://mirror.example.com")),
            ],
            || {
                let config = Config::load(Some(&file)).unwrap();
                assert_eq!(
                    config.cache_dir.as_deref(),
                    Some(Path::new("/opt/hostedtoolcache"))
                );
                assert_eq!(config.temp_dir.as_deref(), Some(Path::new("/tmp/file")));
                assert_eq!(config.registry_url, "https://mirror.example.com");
            },
        );
    }

    #[test]
    fn test_temp_dir_fallback() {
        without_env(|| {
            let config = Config::load(None).unwrap();
            assert_eq!(config.temp_dir(), std::env::temp_dir());
        });
    }

    #[test]
    fn test_validate_rejects_absolute_bin_subdir() {
        let config = Config {
            bin_subdir: PathBuf::from("/usr/bin"),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_parent_dir_bin_subdir() {
        for subdir in ["../../..", "node_modules/../../bin"] {
            let config = Config {
                bin_subdir: PathBuf::from(subdir),
                ..Config::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("inside the install root"), "{subdir}");
        }
    }

    #[test]
    fn test_validate_rejects_blank_package() {
        let config = Config {
            package: "  ".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
