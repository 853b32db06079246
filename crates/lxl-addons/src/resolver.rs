//! Install orchestration
//!
//! Installing an addon runs, in order: the platform check, conflict
//! removal, replacement uninstalls, dependency installs, placement, and
//! finally auxiliary files and the post-install command. Stub placements
//! fan out into a concurrent batch of sub-installs that is rolled back as a
//! whole when any member fails.

use crate::error::{Error, Result};
use crate::executor::{resolve_endpoint, AddonExecutor, Placement, StubTree};
use crate::installed::{self, InstalledAddon};
use crate::locks::InstallLocks;
use crate::registry::RemoteRegistry;
use crate::vcs::parse_source_link;
use futures::future::{join_all, BoxFuture, FutureExt};
use lxl_core::types::{Addon, AddonType};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a single install request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyPresent,
}

/// Installed addon with its catalog entry, when the catalog still has one
#[derive(Debug, Clone)]
pub struct ListedAddon {
    pub installed: InstalledAddon,
    pub catalog: Option<Addon>,
}

/// State threaded through one install tree
#[derive(Debug, Clone, Default)]
struct InstallContext {
    /// Identifiers being installed above this point, outermost first
    ancestors: Vec<String>,

    /// Catalogs read from stubs, innermost last
    stubs: Vec<Arc<Vec<Addon>>>,

    /// Identifiers already re-installed from their stub declaration
    redispatched: Vec<String>,
}

impl InstallContext {
    fn lookup(&self, id: &str) -> Option<&Addon> {
        self.stubs
            .iter()
            .rev()
            .find_map(|addons| addons.iter().find(|a| a.id == id))
    }

    fn child(&self, id: &str) -> Self {
        let mut child = self.clone();
        child.ancestors.push(id.to_string());
        child
    }

    fn with_stub(&self, addons: Vec<Addon>) -> Self {
        let mut ctx = self.clone();
        ctx.stubs.push(Arc::new(addons));
        ctx
    }

    fn redispatch(&self, id: &str) -> Self {
        let mut ctx = self.clone();
        ctx.redispatched.push(id.to_string());
        ctx
    }

    fn chain_to(&self, id: &str) -> String {
        let mut chain = self.ancestors.clone();
        chain.push(id.to_string());
        chain.join(" -> ")
    }
}

/// Installs, uninstalls and queries addons
pub struct AddonResolver {
    registry: Arc<RemoteRegistry>,
    executor: AddonExecutor,
    locks: InstallLocks,
}

impl AddonResolver {
    pub fn new(registry: Arc<RemoteRegistry>, executor: AddonExecutor) -> Self {
        Self {
            registry,
            executor,
            locks: InstallLocks::new(),
        }
    }

    pub fn registry(&self) -> &RemoteRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &AddonExecutor {
        &self.executor
    }

    /// Install an addon and everything it needs
    pub async fn install(&self, id: &str) -> Result<()> {
        match self.install_id(id, &InstallContext::default()).await? {
            InstallOutcome::Installed => Ok(()),
            InstallOutcome::AlreadyPresent => Err(Error::AlreadyInstalled { id: id.to_string() }),
        }
    }

    /// Remove every installed entry named `id`
    pub async fn uninstall(&self, id: &str) -> Result<Vec<PathBuf>> {
        self.uninstall_in(id, &InstallContext::default()).await
    }

    /// Remove `id` from the type folders
    ///
    /// When nothing there carries the name, the paths its catalog entry
    /// installs to are removed instead, which covers `path` overrides.
    async fn uninstall_in(&self, id: &str, ctx: &InstallContext) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for entry in installed::find(self.executor.root(), id)? {
            let path = entry.path.clone();
            let gone = tokio::task::spawn_blocking(move || crate::fsops::remove_path(&entry.path))
                .await??;
            if gone {
                info!("Uninstalled {} ({})", id, path.display());
                removed.push(path);
            }
        }

        if removed.is_empty() {
            let declared = match self.lookup(id, ctx).await {
                Ok(declared) => declared,
                Err(e) => {
                    debug!("No catalog entry to uninstall {} from: {}", id, e);
                    None
                }
            };
            if let Some(addon) = declared {
                removed = self.executor.remove_installed(&addon).await?;
            }
        }

        if removed.is_empty() {
            return Err(Error::not_installed(id));
        }
        Ok(removed)
    }

    /// Catalog entries whose identifier contains `filter`, ignoring case
    pub async fn find(&self, filter: &str) -> Result<Vec<Addon>> {
        let needle = filter.to_lowercase();
        let catalog = self.registry.catalog().await?;
        Ok(catalog
            .addons
            .iter()
            .filter(|a| a.id.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    /// Installed addons whose identifier contains `filter`, ignoring case
    ///
    /// Catalog details are attached when the catalog can be fetched; an
    /// unreachable catalog only loses the details.
    pub async fn list(&self, filter: &str) -> Result<Vec<ListedAddon>> {
        let needle = filter.to_lowercase();
        let found: Vec<_> = installed::scan(self.executor.root())?
            .into_iter()
            .filter(|a| a.id.to_lowercase().contains(&needle))
            .collect();

        let catalog = match self.registry.catalog().await {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                warn!("Listing without catalog details: {}", e);
                None
            }
        };

        Ok(found
            .into_iter()
            .map(|installed| {
                let entry = catalog.and_then(|c| {
                    c.addons
                        .iter()
                        .find(|a| a.id == installed.id && a.addon_type != AddonType::Meta)
                        .cloned()
                });
                ListedAddon {
                    installed,
                    catalog: entry,
                }
            })
            .collect())
    }

    async fn lookup(&self, id: &str, ctx: &InstallContext) -> Result<Option<Addon>> {
        if let Some(addon) = ctx.lookup(id) {
            return Ok(Some(addon.clone()));
        }
        Ok(self.registry.catalog().await?.find(id).cloned())
    }

    /// Install `id` unless it is already present
    fn install_id<'a>(
        &'a self,
        id: &'a str,
        ctx: &'a InstallContext,
    ) -> BoxFuture<'a, Result<InstallOutcome>> {
        async move {
            if ctx.ancestors.iter().any(|a| a == id) {
                return Err(Error::DependencyCycle {
                    chain: ctx.chain_to(id),
                });
            }

            let addon = self
                .lookup(id, ctx)
                .await?
                .ok_or_else(|| Error::not_found(id))?;

            let _guard = self.locks.acquire(id, &ctx.ancestors).await?;
            if self.executor.is_installed(&addon) {
                debug!("{} is already installed", id);
                return Ok(InstallOutcome::AlreadyPresent);
            }

            self.install_addon(addon, ctx.child(id)).await?;
            Ok(InstallOutcome::Installed)
        }
        .boxed()
    }

    /// Run the full install sequence for a resolved catalog entry
    fn install_addon(&self, addon: Addon, ctx: InstallContext) -> BoxFuture<'_, Result<()>> {
        async move {
            let platform = self.executor.platform();
            if !addon.supports(platform) {
                return Err(Error::UnsupportedPlatform {
                    id: addon.id.clone(),
                    platform: platform.to_string(),
                });
            }

            self.remove_conflicts(&addon, &ctx).await?;

            for replaced in &addon.replaces {
                match self.uninstall_in(replaced, &ctx).await {
                    Ok(_) => info!("{} replaces {}", addon.id, replaced),
                    Err(Error::NotInstalled { .. }) => {}
                    Err(e) => return Err(e),
                }
            }

            self.install_dependencies(&addon, &ctx).await?;

            match self.executor.place(&addon).await? {
                Placement::Placed => {}
                Placement::Stub(stub) => {
                    if self.install_stub(&addon, stub, &ctx).await? {
                        return Ok(());
                    }
                }
            }

            self.executor.finish(&addon).await?;
            info!("Installed {}", addon.id);
            Ok(())
        }
        .boxed()
    }

    async fn remove_conflicts(&self, addon: &Addon, ctx: &InstallContext) -> Result<()> {
        for conflict in addon.conflicts.keys() {
            let removed = match self.lookup(conflict, ctx).await? {
                Some(entry) => self.executor.remove_installed(&entry).await?,
                None => match self.uninstall_in(conflict, ctx).await {
                    Ok(paths) => paths,
                    Err(Error::NotInstalled { .. }) => Vec::new(),
                    Err(e) => return Err(e),
                },
            };
            if !removed.is_empty() {
                info!("Removed {} (conflicts with {})", conflict, addon.id);
            }
        }
        Ok(())
    }

    async fn install_dependencies(&self, addon: &Addon, ctx: &InstallContext) -> Result<()> {
        for (dependency, spec) in &addon.dependencies {
            let present = match self.lookup(dependency, ctx).await? {
                Some(entry) => self.executor.is_installed(&entry),
                None => !installed::find(self.executor.root(), dependency)?.is_empty(),
            };
            if present {
                debug!("Dependency {} of {} already installed", dependency, addon.id);
                continue;
            }

            match self.install_id(dependency, ctx).await {
                Ok(_) => {}
                Err(e) if spec.optional => {
                    warn!(
                        "Optional dependency {} of {} failed: {}",
                        dependency, addon.id, e
                    );
                }
                Err(e) => {
                    return Err(Error::DependencyFailed {
                        dependency: dependency.clone(),
                        source: Box::new(e),
                    })
                }
            }
        }
        Ok(())
    }

    /// Install everything a stub lists, then the requested addon itself
    ///
    /// The stub tree is never placed as a whole. When the stub declares the
    /// requested addon, that declaration is installed and true is returned;
    /// otherwise the batch alone is the install.
    async fn install_stub(
        &self,
        addon: &Addon,
        stub: StubTree,
        ctx: &InstallContext,
    ) -> Result<bool> {
        let batch_ctx = ctx.with_stub(stub.manifest.addons.clone());
        let members: Vec<&Addon> = stub
            .manifest
            .addons
            .iter()
            .filter(|a| a.id != addon.id)
            .collect();

        let results = join_all(
            members
                .iter()
                .map(|member| self.install_id(&member.id, &batch_ctx)),
        )
        .await;

        let mut completed = Vec::new();
        let mut failures = Vec::new();
        for (member, result) in members.into_iter().zip(results) {
            match result {
                Ok(InstallOutcome::Installed) => completed.push(member),
                Ok(InstallOutcome::AlreadyPresent) => {}
                Err(e) => failures.push((member.id.clone(), e)),
            }
        }

        if !failures.is_empty() {
            for member in completed {
                match self.executor.remove_installed(member).await {
                    Ok(_) => info!("Rolled back {}", member.id),
                    Err(e) => warn!("Cannot roll back {}: {}", member.id, e),
                }
            }
            return Err(Error::StubBatch {
                id: addon.id.clone(),
                failures,
            });
        }

        let Some(declared) = stub.manifest.find(&addon.id) else {
            debug!("{} is installed through its stub batch", addon.id);
            return Ok(false);
        };
        if ctx.redispatched.contains(&addon.id) {
            debug!("{} already installed from its stub declaration", addon.id);
            return Ok(false);
        }

        if declared.diverges_from(addon) {
            warn!(
                "Catalog entry for {} differs from its repository, installing the repository version",
                addon.id
            );
        }
        self.install_addon(
            stub_declaration(addon, declared),
            batch_ctx.redispatch(&addon.id),
        )
        .await?;
        Ok(true)
    }
}

/// A stub's own declaration of the addon being installed
///
/// A declaration naming the repository the stub was cloned from loses its
/// `remote`, so it resolves inside the checked-out tree instead of cloning
/// again.
fn stub_declaration(addon: &Addon, declared: &Addon) -> Addon {
    let mut declared = declared.clone();
    if declared.remote.is_empty() {
        return declared;
    }
    if let (Ok(outer), Ok(inner)) = (resolve_endpoint(addon), resolve_endpoint(&declared)) {
        if same_repository(&outer.location, &inner.location) {
            declared.remote.clear();
        }
    }
    declared
}

/// Whether two endpoints name the same repository, whatever ref they pin
fn same_repository(a: &str, b: &str) -> bool {
    match (parse_source_link(a), parse_source_link(b)) {
        (Ok(a), Ok(b)) => a.repo == b.repo,
        _ => a == b,
    }
}
