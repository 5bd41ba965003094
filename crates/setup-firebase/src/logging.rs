//! Tracing setup for the setup-firebase binary.
//!
//! Logs always go to stderr so stdout carries only the result.

use std::io;
pub use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown at the requested level.
const CRATES: [&str; 4] = [
    "setup_firebase",
    "setup_firebase_core",
    "setup_firebase_cache",
    "setup_firebase_npm",
];

/// Level for a `-v` count. Installs report progress at info by default.
#[must_use]
pub const fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter directives enabling `level` for the workspace crates only.
#[must_use]
pub fn filter_directives(level: Level) -> String {
    let level_str = level.as_str().to_ascii_lowercase();
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level_str}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing. `RUST_LOG` wins over `verbosity` when set.
///
/// # Errors
///
/// Returns an error if the filter cannot be built.
pub fn init_tracing(verbosity: u8, json: bool) -> miette::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(level_for(verbosity))))
        .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true);
        registry.with(layer).init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .without_time()
            .with_target(false);
        registry.with(layer).init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), json, "Tracing initialized");
    Ok(())
}
