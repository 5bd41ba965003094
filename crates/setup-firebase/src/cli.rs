use clap::{ArgAction, Parser, ValueEnum};
use miette::{Diagnostic, Report};
use serde::Serialize;
use setup_firebase_core::{Config, ResolverBackend, VersionSpec};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Resolution, installation, cache, or export failure exit code
pub const EXIT_FAILURE: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(setup_firebase::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The tool could not be resolved, installed, or cached (exit code 3)
    #[error("{message}")]
    #[diagnostic(code(setup_firebase::cli::install))]
    Install {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(setup_firebase::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new other error with help text
    #[must_use]
    pub fn other_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

/// Convert `setup_firebase_core::Error` to the matching `CliError` variant.
///
/// - Configuration errors -> Config (exit code 2)
/// - Resolution, installation, cache and export errors -> Install (exit code 3)
/// - I/O errors -> Other (exit code 3)
impl From<setup_firebase_core::Error> for CliError {
    fn from(err: setup_firebase_core::Error) -> Self {
        use setup_firebase_core::Error as CoreError;

        match err {
            // Extract just the message to avoid "configuration error: Configuration error:"
            CoreError::Configuration { message, help } => Self::Config { message, help },
            CoreError::Resolution { .. }
            | CoreError::Installation { .. }
            | CoreError::CacheStore(_)
            | CoreError::Export { .. } => Self::Install {
                help: err.help().map(|h| h.to_string()),
                message: err.to_string(),
            },
            CoreError::Io { .. } => Self::other_with_help(
                err.to_string(),
                "Check file permissions and ensure the path exists",
            ),
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Install { .. } | CliError::Other { .. } => EXIT_FAILURE,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let error_envelope = ErrorEnvelope::new(serde_json::json!({
            "code": match err {
                CliError::Config { .. } => "config",
                CliError::Install { .. } => "install",
                CliError::Other { .. } => "other",
            },
            "message": err.to_string()
        }));

        match serde_json::to_string(&error_envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct OkEnvelope<T> {
    /// Status indicator - always "ok" for success
    pub status: &'static str,
    /// The actual data payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Create a new success envelope
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope<E> {
    /// Status indicator - always "error" for failures
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Create a new error envelope
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Resolver backend selectable from the command line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ResolverArg {
    /// Ask `npm view`
    Npm,
    /// Query the registry over HTTP
    Http,
}

impl From<ResolverArg> for ResolverBackend {
    fn from(arg: ResolverArg) -> Self {
        match arg {
            ResolverArg::Npm => Self::Npm,
            ResolverArg::Http => Self::Http,
        }
    }
}

/// Install firebase-tools into the runner tool cache and expose its bin dir.
#[derive(Parser, Debug)]
#[command(name = "setup-firebase")]
#[command(about = "Install and cache firebase-tools for CI pipelines")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Version to install: `latest` or an exact version.
    #[arg(
        long,
        env = "INPUT_VERSION",
        default_value = setup_firebase_core::LATEST,
        help = "firebase-tools version to install (`latest` or exact, e.g. 10.0.2)"
    )]
    pub version_spec: String,

    /// Tool cache root.
    #[arg(long, value_name = "DIR", help = "Tool cache root directory")]
    pub cache_dir: Option<PathBuf>,

    /// Base directory for temporary installs.
    #[arg(long, value_name = "DIR", help = "Base directory for temporary installs")]
    pub temp_dir: Option<PathBuf>,

    /// Registry URL.
    #[arg(long, value_name = "URL", help = "npm registry URL")]
    pub registry: Option<String>,

    /// How `latest` is resolved.
    #[arg(long, value_enum, help = "Backend used to resolve `latest`")]
    pub resolver: Option<ResolverArg>,

    /// TOML config file.
    #[arg(long, value_name = "PATH", help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    /// List cached versions and exit.
    #[arg(long, help = "List cached versions for this architecture and exit")]
    pub list_cached: bool,

    /// Emit JSON on stdout and JSON log lines on stderr.
    #[arg(long, help = "Emit JSON output")]
    pub json: bool,

    /// Increase logging verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging verbosity")]
    pub verbose: u8,
}

impl Cli {
    /// Requested version. An empty value (unset action input) means latest.
    #[must_use]
    pub fn version_spec(&self) -> VersionSpec {
        let raw = self.version_spec.trim();
        if raw.is_empty() {
            VersionSpec::Latest
        } else {
            VersionSpec::parse(raw)
        }
    }

    /// Apply flag overrides on top of file and environment configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.temp_dir {
            config.temp_dir = Some(dir.clone());
        }
        if let Some(url) = &self.registry {
            config.registry_url.clone_from(url);
        }
        if let Some(resolver) = self.resolver {
            config.resolver = resolver.into();
        }
    }
}
