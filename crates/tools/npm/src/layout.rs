//! Where npm puts executables inside an install root.

use setup_firebase_core::config::DEFAULT_BIN_SUBDIR;
use setup_firebase_core::tools::ExecutableLayout;
use std::path::{Path, PathBuf};

/// `<install_root>/node_modules/.bin` unless configured otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeModulesLayout {
    subdir: PathBuf,
}

impl Default for NodeModulesLayout {
    fn default() -> Self {
        Self::new(DEFAULT_BIN_SUBDIR)
    }
}

impl NodeModulesLayout {
    /// Layout with a relative bin subdir.
    #[must_use]
    pub fn new(subdir: impl Into<PathBuf>) -> Self {
        Self {
            subdir: subdir.into(),
        }
    }
}

impl ExecutableLayout for NodeModulesLayout {
    fn bin_dir(&self, install_root: &Path) -> PathBuf {
        install_root.join(&self.subdir)
    }
}
