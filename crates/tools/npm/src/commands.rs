//! npm CLI command wrappers.
//!
//! Builds the `npm view`, `npm install`, and `npm --version` invocations
//! the registry and package manager providers run.

use setup_firebase_core::tools::InstallRequest;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Default npm executable for the host.
#[cfg(windows)]
pub const NPM_PROGRAM: &str = "npm.cmd";
/// Default npm executable for the host.
#[cfg(not(windows))]
pub const NPM_PROGRAM: &str = "npm";

/// How to invoke npm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmCli {
    program: PathBuf,
    registry: Option<String>,
}

impl Default for NpmCli {
    fn default() -> Self {
        Self::new()
    }
}

impl NpmCli {
    /// Use `npm` from the search path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(NPM_PROGRAM),
            registry: None,
        }
    }

    /// Use a specific npm executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Pass `--registry <url>` to every invocation.
    #[must_use]
    pub fn with_registry(mut self, url: impl Into<String>) -> Self {
        self.registry = Some(url.into());
        self
    }

    /// The npm executable.
    #[must_use]
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn base(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(url) = &self.registry {
            cmd.arg("--registry").arg(url);
        }
        cmd
    }

    /// `npm view <package> version`, output captured.
    #[must_use]
    pub fn view_version(&self, package: &str) -> Command {
        let mut cmd = self.base();
        cmd.args(["view", package, "version"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// `npm install <package>@<version>` run inside the request's working
    /// dir. Output is inherited so install progress stays visible.
    #[must_use]
    pub fn install(&self, request: &InstallRequest) -> Command {
        let mut cmd = self.base();
        cmd.arg("install")
            .arg(request.package_spec())
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }

    /// `npm --version`, stdout captured and stderr discarded.
    #[must_use]
    pub fn version(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd
    }
}
