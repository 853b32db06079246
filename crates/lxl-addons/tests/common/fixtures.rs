//! Per-test environment
//!
//! Each [`TestEnv`] owns a temporary config root and a mock HTTP server that
//! serves the only subscribed catalog.

#![allow(dead_code)]

use super::constants::*;
use super::mocks::{mock_body, FakeSourceControl};
use lxl_addons::{AddonExecutor, AddonResolver, Fetcher, HttpFetcher, RemoteRegistry};
use lxl_core::config::NetworkConfig;
use lxl_core::types::{Addon, SubscriptionState};
use lxl_core::Platform;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

pub struct TestEnv {
    pub root: TempDir,
    pub server: MockServer,
    pub vcs: Arc<FakeSourceControl>,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self {
            root: TempDir::new().expect("temp root"),
            server: MockServer::start().await,
            vcs: Arc::new(FakeSourceControl::new()),
        }
    }

    /// Replace the source control double
    pub fn with_vcs(mut self, vcs: FakeSourceControl) -> Self {
        self.vcs = Arc::new(vcs);
        self
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path under the config root
    pub fn file(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.server.uri(), route)
    }

    pub fn manifest_url(&self) -> String {
        self.url(MANIFEST_PATH)
    }

    /// Serve a catalog holding `addons` as the subscribed remote
    pub async fn serve_catalog(&self, addons: Vec<Addon>) {
        mock_body(&self.server, MANIFEST_PATH, &super::catalog_json(addons)).await;
    }

    pub fn fetcher() -> Arc<dyn Fetcher> {
        Arc::new(HttpFetcher::new(&NetworkConfig::default()).expect("http client"))
    }

    pub fn platform() -> Platform {
        Platform::new(TEST_OS, TEST_ARCH)
    }

    /// Registry subscribed to `remotes`, persisting under the config root
    pub fn registry_for(&self, remotes: Vec<String>) -> RemoteRegistry {
        RemoteRegistry::from_state(
            SubscriptionState { remotes },
            self.file("lxl/status.toml"),
            Self::fetcher(),
        )
    }

    pub fn registry(&self) -> RemoteRegistry {
        self.registry_for(vec![self.manifest_url()])
    }

    pub fn executor(&self) -> AddonExecutor {
        AddonExecutor::new(
            self.path(),
            Self::platform(),
            Self::fetcher(),
            self.vcs.clone(),
        )
    }

    pub fn resolver(&self) -> AddonResolver {
        AddonResolver::new(Arc::new(self.registry()), self.executor())
    }

    /// Whether anything exists at `rel` under the config root
    pub fn exists(&self, rel: &str) -> bool {
        self.file(rel).symlink_metadata().is_ok()
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.file(rel)).expect("readable file")
    }

    /// Create a file under the config root
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.file(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        std::fs::write(path, content).expect("write file");
    }

    /// Entries left in the scratch directory
    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.file("lxl/tmp"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
