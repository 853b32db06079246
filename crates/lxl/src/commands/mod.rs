//! CLI command implementations

pub mod common;
pub mod find;
pub mod install;
pub mod list;
pub mod remotes;
pub mod uninstall;

use anyhow::{Context as _, Result};
use lxl_addons::{AddonExecutor, AddonResolver, Fetcher, GitCli, HttpFetcher, RemoteRegistry};
use lxl_core::{ConfigLoader, Platform};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Shared state every command is built from
pub struct Context {
    loader: ConfigLoader,
    fetcher: Arc<dyn Fetcher>,
}

impl Context {
    /// Resolve the config root and runtime configuration
    ///
    /// `root` overrides the config root lookup when given.
    pub fn new(root: Option<&Path>) -> Result<Self> {
        let loader = match root {
            Some(root) => ConfigLoader::with_root(root),
            None => ConfigLoader::new().context("Failed to locate the Lite XL config directory")?,
        };
        let config = loader
            .load_runtime_config()
            .context("Failed to load runtime configuration")?;
        let fetcher = HttpFetcher::new(&config.network).context("Failed to create HTTP client")?;

        debug!("Using config root {}", loader.root().display());
        Ok(Self {
            loader,
            fetcher: Arc::new(fetcher),
        })
    }

    /// Load the subscription registry
    pub fn registry(&self) -> Result<RemoteRegistry> {
        RemoteRegistry::load(self.loader.status_path(), Arc::clone(&self.fetcher))
            .context("Failed to load subscribed remotes")
    }

    /// Build a resolver installing into the config root for this platform
    pub fn resolver(&self) -> Result<AddonResolver> {
        self.resolver_with(|executor| executor)
    }

    /// Like [`Context::resolver`], letting the caller adjust the executor
    pub fn resolver_with(
        &self,
        configure: impl FnOnce(AddonExecutor) -> AddonExecutor,
    ) -> Result<AddonResolver> {
        let registry = Arc::new(self.registry()?);
        let executor = AddonExecutor::new(
            self.loader.root(),
            Platform::current(),
            Arc::clone(&self.fetcher),
            Arc::new(GitCli),
        );
        Ok(AddonResolver::new(registry, configure(executor)))
    }
}
