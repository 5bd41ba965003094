//! Wiring: configuration to collaborators to installer to exports.

use setup_firebase_cache::ToolCache;
use setup_firebase_core::config::DEFAULT_REGISTRY_URL;
use setup_firebase_core::tools::{Arch, PackageManager, PackageRegistry};
use setup_firebase_core::{
    Config, Installer, PathExporter, ResolverBackend, ToolPath, VersionResolver,
};
use setup_firebase_npm::{HttpRegistry, NodeModulesLayout, NpmCli, NpmPackageManager, NpmRegistry};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::{Cli, CliError};
use crate::github::{GithubOutput, GithubPath};

/// What a successful run produced.
#[derive(Debug)]
pub enum Outcome {
    /// The tool is installed and its bin dir exported.
    Installed(ToolPath),
    /// `--list-cached`: complete cached versions, oldest first.
    Listed(Vec<String>),
}

/// Effective configuration: file, then environment, then flags.
///
/// # Errors
///
/// Returns a configuration error if the file is unreadable or the result
/// is invalid.
pub fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;
    debug!(?config, "Effective configuration");
    Ok(config)
}

fn npm_cli(config: &Config) -> NpmCli {
    let cli = NpmCli::new();
    // Leave npm's own registry settings alone unless one was asked for.
    if config.registry_url == DEFAULT_REGISTRY_URL {
        cli
    } else {
        cli.with_registry(&config.registry_url)
    }
}

fn registry(config: &Config, npm: &NpmCli) -> Result<Arc<dyn PackageRegistry>, CliError> {
    let registry: Arc<dyn PackageRegistry> = match config.resolver {
        ResolverBackend::Npm => Arc::new(NpmRegistry::new(npm.clone())),
        ResolverBackend::Http => Arc::new(HttpRegistry::new(config.registry_url.clone())?),
    };
    debug!(backend = registry.name(), "Selected version resolver");
    Ok(registry)
}

/// Check each distinct backend once before doing any work.
///
/// The npm resolver runs the same executable as the package manager, so
/// its check is covered by the manager's.
async fn check_prerequisites(
    resolver: ResolverBackend,
    registry: &dyn PackageRegistry,
    package_manager: &dyn PackageManager,
) -> Result<(), CliError> {
    package_manager.check_prerequisites().await?;
    if resolver != ResolverBackend::Npm {
        registry.check_prerequisites().await?;
    }
    Ok(())
}

/// Resolve, install or reuse, then export.
///
/// # Errors
///
/// Returns the first failure; nothing is retried.
pub async fn run(cli: &Cli) -> Result<Outcome, CliError> {
    let config = load_config(cli)?;
    let cache = ToolCache::new(config.cache_dir()?);

    if cli.list_cached {
        let versions = cache
            .versions(&config.tool, Arch::current())
            .map_err(setup_firebase_core::Error::from)?;
        return Ok(Outcome::Listed(versions));
    }

    let npm = npm_cli(&config);
    let registry = registry(&config, &npm)?;
    let package_manager: Arc<dyn PackageManager> = Arc::new(NpmPackageManager::new(npm));

    check_prerequisites(config.resolver, registry.as_ref(), package_manager.as_ref()).await?;

    let installer = Installer::new(
        VersionResolver::new(&config.package, registry),
        package_manager,
        Arc::new(cache),
        Arc::new(NodeModulesLayout::new(&config.bin_subdir)),
    )
    .with_tool(&config.tool)
    .with_temp_dir(config.temp_dir());

    let tool_path = installer.get_tool_path(&cli.version_spec()).await?;
    export(&tool_path)?;

    info!(
        version = %tool_path.version,
        bin_dir = %tool_path.bin_dir.display(),
        cache_hit = tool_path.cache_hit,
        "firebase-tools ready"
    );
    Ok(Outcome::Installed(tool_path))
}

/// Hand the result to later pipeline steps when running under GitHub Actions.
fn export(tool_path: &ToolPath) -> setup_firebase_core::Result<()> {
    if let Some(exporter) = GithubPath::from_env() {
        exporter.export(&tool_path.bin_dir)?;
    }
    if let Some(output) = GithubOutput::from_env() {
        output.set("path", &tool_path.bin_dir.to_string_lossy())?;
        output.set("version", tool_path.version.as_str())?;
        output.set("cache-hit", if tool_path.cache_hit { "true" } else { "false" })?;
    }
    Ok(())
}
