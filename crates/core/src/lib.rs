//! Core of setup-firebase: version resolution and cache-aware installation.
//!
//! A run is a straight call chain:
//!
//! 1. [`VersionResolver`] turns a [`VersionSpec`] (`latest` or an exact
//!    version) into a [`ResolvedVersion`].
//! 2. [`Installer`] looks the version up in a [`tools::CacheStore`],
//!    installing it through a [`tools::PackageManager`] and persisting it on a
//!    miss.
//! 3. The executable directory, located via [`tools::ExecutableLayout`], is
//!    returned in a [`ToolPath`] together with an augmented [`SearchPath`].
//!
//! # Example
//!
//! ```ignore
//! use setup_firebase_core::{Installer, VersionResolver, VersionSpec};
//!
//! let resolver = VersionResolver::new("firebase-tools", registry);
//! let installer = Installer::new(resolver, npm, cache, layout);
//! let tool = installer.get_tool_path(&VersionSpec::Latest).await?;
//! println!("{}", tool.bin_dir.display());
//! ```

pub mod config;
mod error;
mod installer;
pub mod paths;
mod search_path;
pub mod tools;
mod version;

pub use config::{Config, ResolverBackend};
pub use error::{Error, Result};
pub use installer::{Installer, ToolPath};
pub use search_path::{PathExporter, SearchPath};
pub use version::{LATEST, ResolvedVersion, VersionResolver, VersionSpec};
