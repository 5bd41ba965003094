//! setup-firebase: install firebase-tools on CI runners.
//!
//! The binary resolves the requested version, installs it with npm on a
//! cache miss, stores it in the runner tool cache, and exports the
//! `node_modules/.bin` directory to later pipeline steps.

pub mod app;
pub mod cli;
pub mod github;
pub mod logging;

pub use app::{Outcome, run};
pub use cli::{Cli, CliError};
