//! "Latest version" lookups against the npm registry.
//!
//! Two backends share the [`PackageRegistry`] contract: [`NpmRegistry`]
//! shells out to `npm view`, [`HttpRegistry`] reads the registry's
//! dist-tag document directly.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use setup_firebase_core::tools::PackageRegistry;
use setup_firebase_core::{Error, Result};
use tracing::debug;

use crate::commands::NpmCli;
use crate::prerequisites;

/// Registry backed by `npm view <package> version`.
#[derive(Debug, Clone, Default)]
pub struct NpmRegistry {
    cli: NpmCli,
}

impl NpmRegistry {
    /// Create a registry using the given npm invocation.
    #[must_use]
    pub fn new(cli: NpmCli) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl PackageRegistry for NpmRegistry {
    fn name(&self) -> &'static str {
        "npm"
    }

    async fn latest_version(&self, package: &str) -> Result<String> {
        debug!(%package, "Running npm view");
        let output = self
            .cli
            .view_version(package)
            .output()
            .await
            .map_err(|e| Error::resolution(package, format!("Failed to run npm: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::resolution(
                package,
                format!("npm view failed ({}): {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn check_prerequisites(&self) -> Result<()> {
        prerequisites::check_npm(&self.cli).await
    }
}

/// The subset of a registry version document we read.
#[derive(Debug, Deserialize)]
struct VersionDocument {
    version: String,
}

/// Registry backed by `GET <registry>/<package>/latest`.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: Client,
    base_url: String,
}

impl HttpRegistry {
    /// Create a registry client for `base_url` (e.g. `https://registry.npmjs.org`).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("setup-firebase/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// URL of the `latest` dist-tag document for `package`.
    ///
    /// Scoped names keep their `@` but have the `/` escaped, as the
    /// registry expects.
    #[must_use]
    pub fn latest_url(&self, package: &str) -> String {
        format!(
            "{}/{}/latest",
            self.base_url.trim_end_matches('/'),
            package.replace('/', "%2f")
        )
    }
}

#[async_trait]
impl PackageRegistry for HttpRegistry {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn latest_version(&self, package: &str) -> Result<String> {
        let url = self.latest_url(package);
        debug!(%url, "Fetching latest version document");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::resolution(package, format!("Failed to query registry: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::resolution(
                package,
                format!("registry returned HTTP {} for {url}", response.status()),
            ));
        }

        let document: VersionDocument = response.json().await.map_err(|e| {
            Error::resolution(package, format!("Failed to parse registry response: {e}"))
        })?;
        Ok(document.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_latest_url() {
        let registry = HttpRegistry::new("https://registry.npmjs.org/").unwrap();
        assert_eq!(
            registry.latest_url("firebase-tools"),
            "https://registry.npmjs.org/firebase-tools/latest"
        );
        assert_eq!(
            registry.latest_url("@firebase/cli"),
            "https://registry.npmjs.org/@firebase%2fcli/latest"
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(NpmRegistry::default().name(), "npm");
        assert_eq!(HttpRegistry::new("http://x").unwrap().name(), "http");
    }

    #[tokio::test]
    async fn test_http_latest_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/firebase-tools/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"name": "firebase-tools", "version": "10.0.2"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let registry = HttpRegistry::new(server.uri()).unwrap();
        let version = registry.latest_version("firebase-tools").await.unwrap();
        assert_eq!(version, "10.0.2");
    }

    #[tokio::test]
    async fn test_http_not_found_is_resolution_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let registry = HttpRegistry::new(server.uri()).unwrap();
        let err = registry.latest_version("no-such-pkg").await.unwrap_err();
        assert!(matches!(err, Error::Resolution { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_http_malformed_body_is_resolution_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let registry = HttpRegistry::new(server.uri()).unwrap();
        let err = registry.latest_version("firebase-tools").await.unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[tokio::test]
    async fn test_npm_missing_program_is_resolution_error() {
        let registry = NpmRegistry::new(NpmCli::new().with_program("/nonexistent/npm"));
        let err = registry.latest_version("firebase-tools").await.unwrap_err();
        assert!(matches!(err, Error::Resolution { .. }));
        assert!(err.to_string().contains("Failed to run npm"));
    }
}
