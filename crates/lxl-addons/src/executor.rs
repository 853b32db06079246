//! Addon placement
//!
//! Decides where an addon's content comes from, fetches it, and puts it at
//! its destination under the config root. Content arrives in one of three
//! shapes:
//!
//! - a single script written straight to `<folder>/<id>.lua`
//! - a directory tree fetched into scratch space and moved into place
//! - a stub: a fetched tree whose `manifest.json` lists further addons,
//!   handed back to the resolver as [`Placement::Stub`]

use crate::catalog::{self, MANIFEST_FILE};
use crate::entry::{is_relevant, EntryInfo};
use crate::error::{Error, Result};
use crate::fetcher::{is_http, read_endpoint, Fetcher};
use crate::fsops::{self, with_default_extension};
use crate::vcs::{parse_source_link, SourceControl};
use lxl_core::config::ConfigLoader;
use lxl_core::platform::Platform;
use lxl_core::types::{Addon, FileArtifact, Manifest, SCRIPT_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

/// Where an addon's primary content lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// URL or local path
    pub location: String,

    /// Whether the content is one file rather than a tree
    pub singleton: bool,

    /// Index of the file artifact the endpoint was taken from
    pub primary_file: Option<usize>,
}

/// Work the resolver has to finish after placement
#[derive(Debug)]
pub enum Placement {
    /// Content is at its destination
    Placed,

    /// Fetched tree is a stub catalog
    Stub(StubTree),
}

/// Scratch checkout holding a stub catalog
///
/// The scratch directory is removed when this is dropped.
#[derive(Debug)]
pub struct StubTree {
    pub scratch: TempDir,
    pub manifest: Manifest,
}

impl StubTree {
    pub fn path(&self) -> &Path {
        self.scratch.path()
    }
}

/// Resolve a reference against the catalog the addon came from
///
/// Absolute URLs and absolute paths are used as they are.
fn resolve_location(addon: &Addon, reference: &str) -> Result<String> {
    if reference.contains("://") || Path::new(reference).is_absolute() {
        return Ok(reference.to_string());
    }
    match &addon.origin {
        Some(origin) => Ok(origin.join(reference)?),
        None => Ok(reference.to_string()),
    }
}

/// Derive an addon's endpoint
///
/// Precedence: explicit `url`, then (without `remote`) the conventional
/// `<folder>/<id>.lua` next to the catalog or a sole file artifact, then
/// `remote`. Only the `url` and file shortcuts are singletons regardless of
/// their extension.
pub fn resolve_endpoint(addon: &Addon) -> Result<Endpoint> {
    if !addon.url.is_empty() {
        return Ok(Endpoint {
            location: resolve_location(addon, &addon.url)?,
            singleton: true,
            primary_file: None,
        });
    }

    if addon.remote.is_empty() {
        return match addon.files.len() {
            0 => {
                let origin = addon
                    .origin
                    .as_ref()
                    .ok_or_else(|| Error::no_endpoint(&addon.id, "no remote and no catalog"))?;
                let location = origin.join(&format!(
                    "{}/{}.{}",
                    addon.addon_type.folder(),
                    addon.id,
                    SCRIPT_EXTENSION
                ))?;
                Ok(Endpoint {
                    location,
                    singleton: true,
                    primary_file: None,
                })
            }
            1 => Ok(Endpoint {
                location: resolve_location(addon, &addon.files[0].url)?,
                singleton: true,
                primary_file: Some(0),
            }),
            n => Err(Error::no_endpoint(
                &addon.id,
                format!("{} files and no remote", n),
            )),
        };
    }

    let location = resolve_location(addon, &addon.remote)?;
    let singleton = location.ends_with(&format!(".{}", SCRIPT_EXTENSION));
    Ok(Endpoint {
        location,
        singleton,
        primary_file: None,
    })
}

/// Extension of the last segment of a location, `lua` when there is none
fn endpoint_extension(location: &str) -> String {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| SCRIPT_EXTENSION.to_string())
}

/// Called with the addon id and command before a post-install command takes
/// over the terminal
pub type PostInstallHook = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Places addon content under a config root
pub struct AddonExecutor {
    root: PathBuf,
    scratch_dir: PathBuf,
    platform: Platform,
    fetcher: Arc<dyn Fetcher>,
    vcs: Arc<dyn SourceControl>,
    post_install_hook: Option<PostInstallHook>,
}

impl AddonExecutor {
    /// Create an executor installing under `root`
    pub fn new(
        root: impl Into<PathBuf>,
        platform: Platform,
        fetcher: Arc<dyn Fetcher>,
        vcs: Arc<dyn SourceControl>,
    ) -> Self {
        let root = root.into();
        let scratch_dir = ConfigLoader::with_root(&root).scratch_dir();
        Self {
            root,
            scratch_dir,
            platform,
            fetcher,
            vcs,
            post_install_hook: None,
        }
    }

    /// Run `hook` ahead of every post-install command
    pub fn with_post_install_hook(mut self, hook: PostInstallHook) -> Self {
        self.post_install_hook = Some(hook);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Absolute install path for an addon
    pub fn destination(&self, addon: &Addon) -> PathBuf {
        self.root.join(addon.relative_destination())
    }

    /// Paths an installed copy of the addon may occupy
    pub fn install_paths(&self, addon: &Addon) -> Vec<PathBuf> {
        let dest = self.destination(addon);
        let mut paths = vec![dest.clone()];

        if let Ok(endpoint) = resolve_endpoint(addon) {
            let singleton = with_default_extension(&dest, &endpoint_extension(&endpoint.location));
            if !paths.contains(&singleton) {
                paths.push(singleton);
            }
        }
        let script = with_default_extension(&dest, SCRIPT_EXTENSION);
        if !paths.contains(&script) {
            paths.push(script);
        }
        paths
    }

    /// Whether the addon is present on disk
    pub fn is_installed(&self, addon: &Addon) -> bool {
        self.install_paths(addon)
            .iter()
            .any(|path| path.symlink_metadata().is_ok())
    }

    /// Remove whatever the addon occupies; nothing present is not an error
    pub async fn remove_installed(&self, addon: &Addon) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for path in self.install_paths(addon) {
            if remove_path(path.clone()).await? {
                info!("Removed {}", path.display());
                removed.push(path);
            }
        }
        Ok(removed)
    }

    /// Fetch the addon's primary content and put it in place
    pub async fn place(&self, addon: &Addon) -> Result<Placement> {
        let endpoint = resolve_endpoint(addon)?;
        let dest = self.destination(addon);
        info!("Installing {} from {}", addon.id, endpoint.location);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if endpoint.singleton {
            let bytes = read_endpoint(self.fetcher.as_ref(), &endpoint.location).await?;
            let target = with_default_extension(&dest, &endpoint_extension(&endpoint.location));
            tokio::fs::write(&target, bytes).await?;
            debug!("Wrote {}", target.display());
            return Ok(Placement::Placed);
        }

        if addon.pins_canonical_path() {
            self.fetch_tree(&endpoint.location, &dest).await?;
            return Ok(Placement::Placed);
        }

        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix(&format!("{}-", addon.id))
            .tempdir_in(&self.scratch_dir)?;
        self.fetch_tree(&endpoint.location, scratch.path()).await?;

        let manifest_path = scratch.path().join(MANIFEST_FILE);
        if manifest_path.is_file() {
            let manifest = catalog::read_local_manifest(&manifest_path).await?;
            info!(
                "{} is a stub listing {} addons",
                addon.id,
                manifest.addons.len()
            );
            return Ok(Placement::Stub(StubTree { scratch, manifest }));
        }

        self.place_tree(addon, scratch.path()).await?;
        Ok(Placement::Placed)
    }

    /// Move a fetched tree to the addon's destination
    ///
    /// A tree with exactly one relevant entry installs that entry alone;
    /// otherwise every relevant entry is moved and a failure removes the
    /// partial destination.
    async fn place_tree(&self, addon: &Addon, tree: &Path) -> Result<()> {
        let tree = tree.to_path_buf();
        let dest = self.destination(addon);
        spawn_blocking(move || place_tree_blocking(&tree, &dest)).await?
    }

    /// Download auxiliary files and run the post-install command
    pub async fn finish(&self, addon: &Addon) -> Result<()> {
        let endpoint = resolve_endpoint(addon)?;
        let base = self.artifact_base(addon);

        for (index, file) in addon.files.iter().enumerate() {
            if endpoint.primary_file == Some(index) {
                continue;
            }
            if !file.arch.supports(&self.platform) {
                debug!("Skipping {} (not for {})", file.url, self.platform);
                continue;
            }

            match self.download_file(addon, file, &base).await {
                Ok(path) => debug!("Downloaded {}", path.display()),
                Err(e) if file.optional => {
                    warn!("Optional file {} for {} failed: {}", file.url, addon.id, e)
                }
                Err(e) => return Err(e),
            }
        }

        self.run_post_install(addon, &base).await
    }

    /// Directory auxiliary files and the post command are relative to
    fn artifact_base(&self, addon: &Addon) -> PathBuf {
        let dest = self.destination(addon);
        if dest.is_dir() {
            return dest;
        }
        dest.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone())
    }

    async fn fetch_tree(&self, location: &str, dest: &Path) -> Result<()> {
        let local = Path::new(location);
        if !is_http(location) && local.is_dir() {
            debug!("Copying {} -> {}", local.display(), dest.display());
            let (from, to) = (local.to_path_buf(), dest.to_path_buf());
            return spawn_blocking(move || fsops::copy_tree(&from, &to)).await?;
        }

        let link = parse_source_link(location)?;
        self.vcs.fetch(&link, dest).await
    }

    async fn download_file(&self, addon: &Addon, file: &FileArtifact, base: &Path) -> Result<PathBuf> {
        let location = resolve_location(addon, &file.url)?;
        let name = if file.path.is_empty() {
            file.file_name()
        } else {
            file.path.as_str()
        };
        let target = base.join(name);

        let bytes = read_endpoint(self.fetcher.as_ref(), &location).await?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(target)
    }

    async fn run_post_install(&self, addon: &Addon, cwd: &Path) -> Result<()> {
        let Some(command) = addon.post.for_platform(&self.platform) else {
            return Ok(());
        };
        info!("Running post-install command for {}: {}", addon.id, command);
        if let Some(hook) = &self.post_install_hook {
            hook(&addon.id, command);
        }

        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C");
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c");
            cmd
        };

        let status = cmd
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(Error::PostInstall {
                command: command.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

async fn remove_path(path: PathBuf) -> Result<bool> {
    Ok(spawn_blocking(move || fsops::remove_path(&path)).await??)
}

fn place_tree_blocking(tree: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut relevant = Vec::new();
    for entry in fs::read_dir(tree)? {
        let entry = entry?;
        if is_relevant(&entry) {
            relevant.push(entry);
        }
    }

    if let [single] = relevant.as_slice() {
        let source = single.path();
        let target = if single.is_dir() {
            dest.to_path_buf()
        } else {
            with_default_extension(dest, &endpoint_extension(&source.to_string_lossy()))
        };
        debug!("Moving {} -> {}", source.display(), target.display());
        fs::rename(&source, &target)?;
        return Ok(());
    }

    if let Err(e) = fsops::move_filtered(tree, dest) {
        if let Err(cleanup) = fsops::remove_path(dest) {
            warn!("Cannot clean up {}: {}", dest.display(), cleanup);
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::HttpFetcher;
    use crate::vcs::SourceLink;
    use async_trait::async_trait;
    use lxl_core::config::NetworkConfig;
    use lxl_core::types::{AddonType, ArchFilter, Origin, PostCommand};
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct NoVcs;

    #[async_trait]
    impl SourceControl for NoVcs {
        async fn fetch(&self, link: &SourceLink, _dest: &Path) -> Result<()> {
            Err(Error::Clone {
                repo: link.repo.clone(),
                message: "offline".into(),
            })
        }
    }

    fn executor(root: &Path) -> AddonExecutor {
        AddonExecutor::new(
            root,
            Platform::new("linux", "x86_64"),
            Arc::new(HttpFetcher::new(&NetworkConfig::default()).unwrap()),
            Arc::new(NoVcs),
        )
    }

    fn addon(id: &str) -> Addon {
        Addon {
            id: id.into(),
            origin: Some(
                Origin::remote("https://raw.githubusercontent.com/lite-xl/plugins/master/manifest.json")
                    .unwrap(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint_defaults_to_script_next_to_catalog() {
        let endpoint = resolve_endpoint(&addon("foo")).unwrap();
        assert_eq!(
            endpoint.location,
            "https://raw.githubusercontent.com/lite-xl/plugins/master/plugins/foo.lua"
        );
        assert!(endpoint.singleton);
    }

    #[test]
    fn test_endpoint_url_wins() {
        let mut a = addon("foo");
        a.url = "https://cdn.example/foo.lua".into();
        a.remote = "https://github.com/x/foo".into();
        let endpoint = resolve_endpoint(&a).unwrap();
        assert_eq!(endpoint.location, "https://cdn.example/foo.lua");
        assert!(endpoint.singleton);
    }

    #[test]
    fn test_endpoint_sole_file_is_primary() {
        let mut a = addon("font_x");
        a.addon_type = AddonType::Font;
        a.files = vec![FileArtifact {
            url: "https://cdn.example/x.ttf".into(),
            ..Default::default()
        }];
        let endpoint = resolve_endpoint(&a).unwrap();
        assert_eq!(endpoint.primary_file, Some(0));
        assert!(endpoint.singleton);
    }

    #[test]
    fn test_endpoint_many_files_without_remote_fails() {
        let mut a = addon("x");
        a.files = vec![FileArtifact::default(), FileArtifact::default()];
        assert!(matches!(
            resolve_endpoint(&a),
            Err(Error::NoValidEndpoint { .. })
        ));
    }

    #[test]
    fn test_endpoint_remote_relative_and_absolute() {
        let mut a = addon("lsp");
        a.remote = "https://github.com/lite-xl/lite-xl-lsp:latest".into();
        let endpoint = resolve_endpoint(&a).unwrap();
        assert_eq!(endpoint.location, a.remote);
        assert!(!endpoint.singleton);

        a.remote = "plugins/lsp_extra.lua".into();
        let endpoint = resolve_endpoint(&a).unwrap();
        assert_eq!(
            endpoint.location,
            "https://raw.githubusercontent.com/lite-xl/plugins/master/plugins/lsp_extra.lua"
        );
        assert!(endpoint.singleton);
    }

    #[test]
    fn test_endpoint_extension() {
        assert_eq!(endpoint_extension("https://cdn.example/x.ttf?raw=1"), "ttf");
        assert_eq!(endpoint_extension("https://cdn.example/plugin"), "lua");
        assert_eq!(endpoint_extension("/tmp/stub/plugins/a.lua"), "lua");
    }

    #[tokio::test]
    async fn test_place_singleton_appends_extension() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/plugins/foo.lua"))
            .respond_with(ResponseTemplate::new(200).set_body_string("return {}"))
            .expect(1)
            .mount(&server)
            .await;

        let temp = tempfile::TempDir::new().unwrap();
        let exec = executor(temp.path());
        let mut a = addon("foo");
        a.origin = Some(Origin::remote(&format!("{}/manifest.json", server.uri())).unwrap());

        assert!(!exec.is_installed(&a));
        exec.place(&a).await.unwrap();

        let written = temp.path().join("plugins/foo.lua");
        assert_eq!(fs::read_to_string(written).unwrap(), "return {}");
        assert!(exec.is_installed(&a));
    }

    #[tokio::test]
    async fn test_place_tree_single_file_becomes_script() {
        let temp = tempfile::TempDir::new().unwrap();
        let tree = temp.path().join("tree");
        fs::create_dir_all(&tree).unwrap();
        fs::write(tree.join("main.lua"), "-- main").unwrap();
        fs::write(tree.join("README.md"), "docs").unwrap();

        let exec = executor(temp.path());
        exec.place_tree(&addon("bar"), &tree).await.unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("plugins/bar.lua")).unwrap(),
            "-- main"
        );
    }

    #[tokio::test]
    async fn test_place_tree_moves_relevant_entries() {
        let temp = tempfile::TempDir::new().unwrap();
        let tree = temp.path().join("tree");
        fs::create_dir_all(tree.join("tests")).unwrap();
        fs::write(tree.join("init.lua"), "-- init").unwrap();
        fs::write(tree.join("util.lua"), "-- util").unwrap();
        fs::write(tree.join("LICENSE"), "MIT").unwrap();

        let exec = executor(temp.path());
        exec.place_tree(&addon("baz"), &tree).await.unwrap();

        let dest = temp.path().join("plugins/baz");
        assert!(dest.join("init.lua").is_file());
        assert!(dest.join("util.lua").is_file());
        assert!(!dest.join("LICENSE").exists());
        assert!(!dest.join("tests").exists());
    }

    #[tokio::test]
    async fn test_remove_installed_covers_script_and_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("plugins/foo")).unwrap();
        fs::write(temp.path().join("plugins/foo.lua"), "").unwrap();

        let exec = executor(temp.path());
        let removed = exec.remove_installed(&addon("foo")).await.unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!exec.is_installed(&addon("foo")));
        assert!(exec.remove_installed(&addon("foo")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finish_skips_foreign_arch_and_primary_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bin/server-linux"))
            .respond_with(ResponseTemplate::new(200).set_body_string("elf"))
            .expect(1)
            .mount(&server)
            .await;

        let temp = tempfile::TempDir::new().unwrap();
        let exec = executor(temp.path());
        let mut a = addon("lsp_x");
        a.url = format!("{}/lsp_x.lua", server.uri());
        a.files = vec![
            FileArtifact {
                url: format!("{}/bin/server-linux", server.uri()),
                arch: ArchFilter::new(["x86_64-linux"]),
                ..Default::default()
            },
            FileArtifact {
                url: format!("{}/bin/server.exe", server.uri()),
                arch: ArchFilter::new(["x86_64-windows"]),
                ..Default::default()
            },
        ];

        exec.finish(&a).await.unwrap();

        let base = temp.path().join("plugins");
        assert_eq!(fs::read_to_string(base.join("server-linux")).unwrap(), "elf");
        assert!(!base.join("server.exe").exists());
    }

    #[tokio::test]
    async fn test_finish_optional_file_failure_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = tempfile::TempDir::new().unwrap();
        let exec = executor(temp.path());
        let mut a = addon("x");
        a.url = format!("{}/x.lua", server.uri());
        a.files = vec![FileArtifact {
            url: format!("{}/extra.bin", server.uri()),
            optional: true,
            ..Default::default()
        }];
        exec.finish(&a).await.unwrap();

        a.files[0].optional = false;
        assert!(matches!(
            exec.finish(&a).await,
            Err(Error::HttpStatus { status: 404, .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_post_install_runs_in_destination() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("plugins/tool")).unwrap();
        let exec = executor(temp.path());

        let mut a = addon("tool");
        a.remote = "https://github.com/x/tool".into();
        a.post = PostCommand::everywhere("touch built");
        exec.finish(&a).await.unwrap();
        assert!(temp.path().join("plugins/tool/built").exists());

        a.post = PostCommand::per_os([("linux", "exit 3")]);
        let err = exec.finish(&a).await.unwrap_err();
        assert!(matches!(err, Error::PostInstall { .. }));
    }
}
