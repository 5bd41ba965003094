//! npm provider for setup-firebase.
//!
//! - [`NpmRegistry`] / [`HttpRegistry`] answer "what is latest?"
//! - [`NpmPackageManager`] runs `npm install` into a scratch dir
//! - [`NodeModulesLayout`] locates `node_modules/.bin`

mod commands;
mod layout;
mod manager;
mod prerequisites;
mod registry;

pub use commands::{NPM_PROGRAM, NpmCli};
pub use layout::NodeModulesLayout;
pub use manager::NpmPackageManager;
pub use registry::{HttpRegistry, NpmRegistry};
