//! `npm install` as a [`PackageManager`].

use async_trait::async_trait;
use setup_firebase_core::tools::{InstallRequest, PackageManager};
use setup_firebase_core::{Error, Result};
use tracing::info;

use crate::commands::NpmCli;
use crate::prerequisites;

/// Installs packages into a working dir with `npm install`.
#[derive(Debug, Clone, Default)]
pub struct NpmPackageManager {
    cli: NpmCli,
}

impl NpmPackageManager {
    /// Create a package manager using the given npm invocation.
    #[must_use]
    pub fn new(cli: NpmCli) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl PackageManager for NpmPackageManager {
    fn name(&self) -> &'static str {
        "npm"
    }

    async fn install(&self, request: &InstallRequest) -> Result<()> {
        info!(
            package = %request.package_spec(),
            dir = %request.working_dir.display(),
            "Running npm install"
        );

        let status = self.cli.install(request).status().await.map_err(|e| {
            Error::installation(
                &request.package,
                &request.version,
                format!("Failed to run npm: {e}"),
            )
        })?;

        if !status.success() {
            return Err(Error::installation(
                &request.package,
                &request.version,
                format!("npm exited with {status}"),
            ));
        }
        Ok(())
    }

    async fn check_prerequisites(&self) -> Result<()> {
        prerequisites::check_npm(&self.cli).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_without_npm_is_installation_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = NpmPackageManager::new(NpmCli::new().with_program("/nonexistent/npm"));
        let request = InstallRequest {
            package: "firebase-tools".into(),
            version: "9.1.0".into(),
            working_dir: dir.path().to_path_buf(),
        };

        let err = manager.install(&request).await.unwrap_err();
        assert!(matches!(err, Error::Installation { .. }));
        assert!(err.to_string().contains("9.1.0"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_installation_error() {
        let dir = tempfile::tempdir().unwrap();
        // `false` ignores its arguments and exits 1
        let manager = NpmPackageManager::new(NpmCli::new().with_program("false"));
        let request = InstallRequest {
            package: "firebase-tools".into(),
            version: "9.1.0".into(),
            working_dir: dir.path().to_path_buf(),
        };

        let err = manager.install(&request).await.unwrap_err();
        assert!(err.to_string().contains("npm exited with"));
    }
}
