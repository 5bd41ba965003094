//! Property-based tests for resolution and cache-or-install behavior.
//!
//! - Identity: any exact version other than `latest` resolves to itself
//!   without touching the registry
//! - Idempotence: repeated requests for one version install it once

use async_trait::async_trait;
use proptest::prelude::*;
use setup_firebase_core::tools::{
    Arch, CacheKey, CacheStore, ExecutableLayout, InstallRequest, PackageManager, PackageRegistry,
};
use setup_firebase_core::{
    Error, Installer, LATEST, Result, SearchPath, VersionResolver, VersionSpec,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct CountingRegistry {
    calls: AtomicUsize,
}

#[async_trait]
impl PackageRegistry for CountingRegistry {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn latest_version(&self, _package: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("10.0.2".to_string())
    }
}

#[derive(Default)]
struct CountingManager {
    installs: AtomicUsize,
}

#[async_trait]
impl PackageManager for CountingManager {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn install(&self, request: &InstallRequest) -> Result<()> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        std::fs::create_dir_all(request.working_dir.join("node_modules/.bin"))
            .map_err(|e| Error::installation(&request.package, &request.version, e.to_string()))
    }
}

/// Remembers stored keys; entries live under `root/<version>`.
struct MemoryCache {
    root: PathBuf,
    entries: Mutex<HashMap<CacheKey, PathBuf>>,
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn find(&self, key: &CacheKey) -> Result<Option<PathBuf>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn store(&self, _source_dir: &Path, key: &CacheKey) -> Result<PathBuf> {
        let path = self.root.join(&key.version);
        self.entries
            .lock()
            .unwrap()
            .insert(key.clone(), path.clone());
        Ok(path)
    }
}

struct NodeBin;

impl ExecutableLayout for NodeBin {
    fn bin_dir(&self, install_root: &Path) -> PathBuf {
        install_root.join("node_modules/.bin")
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Semver-looking versions, optionally with a prerelease tag
fn version_strategy() -> impl Strategy<Value = String> {
    (
        0u32..20,
        0u32..20,
        0u32..20,
        prop::option::of("[a-z]{1,6}\\.[0-9]{1,2}"),
    )
        .prop_map(|(major, minor, patch, pre)| match pre {
            Some(pre) => format!("{major}.{minor}.{patch}-{pre}"),
            None => format!("{major}.{minor}.{patch}"),
        })
}

proptest! {
    /// Contract: an exact version passes through untouched with zero
    /// registry calls, whatever its shape
    #[test]
    fn exact_version_resolves_to_itself(v in any::<String>().prop_filter("not the sentinel", |v| v != LATEST)) {
        let registry = Arc::new(CountingRegistry::default());
        let resolver = VersionResolver::new("firebase-tools", registry.clone());

        let resolved = runtime()
            .block_on(resolver.resolve(&VersionSpec::Exact(v.clone())))
            .unwrap();

        prop_assert_eq!(resolved.as_str(), v.as_str());
        prop_assert_eq!(registry.calls.load(Ordering::SeqCst), 0);
    }

    /// Contract: parsing never produces the sentinel for anything but `latest`
    #[test]
    fn parse_only_recognizes_exact_sentinel(v in any::<String>()) {
        prop_assert_eq!(VersionSpec::parse(&v).is_latest(), v == LATEST);
    }

    /// Contract: N requests for the same version install exactly once and
    /// agree on the executable directory
    #[test]
    fn repeated_requests_install_once(version in version_strategy(), calls in 1usize..6) {
        let temp = TempDir::new().unwrap();
        let manager = Arc::new(CountingManager::default());
        let cache = Arc::new(MemoryCache {
            root: temp.path().join("cache"),
            entries: Mutex::new(HashMap::new()),
        });
        let installer = Installer::new(
            VersionResolver::new("firebase-tools", Arc::new(CountingRegistry::default())),
            manager.clone(),
            cache,
            Arc::new(NodeBin),
        )
        .with_temp_dir(temp.path().join("tmp"))
        .with_arch(Arch::X64)
        .with_search_path(SearchPath::new());

        let spec = VersionSpec::parse(&version);
        let rt = runtime();
        let results: Vec<_> = (0..calls)
            .map(|_| rt.block_on(installer.get_tool_path(&spec)).unwrap())
            .collect();

        prop_assert_eq!(manager.installs.load(Ordering::SeqCst), 1);
        prop_assert!(!results[0].cache_hit);
        prop_assert!(results[1..].iter().all(|r| r.cache_hit));
        prop_assert!(results.iter().all(|r| r.bin_dir == results[0].bin_dir));
        prop_assert_eq!(results[0].version.as_str(), version.as_str());
    }
}
