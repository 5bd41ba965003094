//! Host checks shared by the npm-backed providers.

use setup_firebase_core::{Error, Result};
use tracing::debug;

use crate::commands::NpmCli;

/// Verify `npm --version` runs and exits cleanly.
pub(crate) async fn check_npm(cli: &NpmCli) -> Result<()> {
    let output = cli.version().output().await.map_err(|e| {
        Error::configuration_with_help(
            format!("npm not found ({}): {e}", cli.program().display()),
            "Install Node.js (which ships npm) or put npm on PATH",
        )
    })?;

    if !output.status.success() {
        return Err(Error::configuration_with_help(
            format!("`npm --version` exited with {}", output.status),
            "Check that the Node.js installation is intact",
        ));
    }

    let version = String::from_utf8_lossy(&output.stdout);
    debug!(npm_version = %version.trim(), "npm available");
    Ok(())
}
