//! Collaborators consumed by the installer.
//!
//! # Architecture
//!
//! - [`PackageRegistry`] - answers "what is the latest version of X"
//! - [`PackageManager`] - installs `X@version` into a directory
//! - [`CacheStore`] - finds and persists installed directories by [`CacheKey`]
//! - [`ExecutableLayout`] - locates the shim directory inside an install root
//! - [`Arch`] - architecture component of cache keys
//!
//! Provider crates (`setup-firebase-npm`, `setup-firebase-cache`) implement
//! these traits; the installer only sees trait objects.

mod provider;

pub use provider::{
    Arch, CacheKey, CacheStore, ExecutableLayout, InstallRequest, PackageManager, PackageRegistry,
};
