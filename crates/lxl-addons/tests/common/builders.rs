//! Addon builders for creating test catalogs
//!
//! Provides a fluent builder for catalog entries and helpers that turn a set
//! of entries into the JSON a remote would serve.

#![allow(dead_code)]

use super::constants::*;
use lxl_core::types::{
    Addon, AddonType, ArchFilter, DependencySpec, FileArtifact, Manifest, PostCommand,
};

/// Builder for creating Addon test fixtures
pub struct AddonBuilder {
    addon: Addon,
}

impl AddonBuilder {
    /// Create a plugin with the default test version
    pub fn new(id: &str) -> Self {
        Self {
            addon: Addon {
                id: id.to_string(),
                version: TEST_VERSION.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.addon.version = version.to_string();
        self
    }

    pub fn with_type(mut self, addon_type: AddonType) -> Self {
        self.addon.addon_type = addon_type;
        self
    }

    pub fn with_remote(mut self, remote: &str) -> Self {
        self.addon.remote = remote.to_string();
        self
    }

    /// Remote pointing at a repository served by the source control double
    pub fn with_repo(self, name: &str) -> Self {
        self.with_remote(&repo_link(name))
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.addon.url = url.to_string();
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.addon.path = path.to_string();
        self
    }

    pub fn with_arch(mut self, filters: &[&str]) -> Self {
        self.addon.arch = ArchFilter::new(filters.iter().copied());
        self
    }

    pub fn with_dependency(mut self, id: &str) -> Self {
        self.addon
            .dependencies
            .insert(id.to_string(), DependencySpec::default());
        self
    }

    pub fn with_optional_dependency(mut self, id: &str) -> Self {
        self.addon.dependencies.insert(
            id.to_string(),
            DependencySpec {
                optional: true,
                ..Default::default()
            },
        );
        self
    }

    pub fn with_conflict(mut self, id: &str) -> Self {
        self.addon
            .conflicts
            .insert(id.to_string(), DependencySpec::default());
        self
    }

    pub fn with_replaces(mut self, id: &str) -> Self {
        self.addon.replaces.push(id.to_string());
        self
    }

    pub fn with_file(mut self, url: &str) -> Self {
        self.addon.files.push(FileArtifact {
            url: url.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn with_optional_file(mut self, url: &str) -> Self {
        self.addon.files.push(FileArtifact {
            url: url.to_string(),
            optional: true,
            ..Default::default()
        });
        self
    }

    pub fn with_post(mut self, command: &str) -> Self {
        self.addon.post = PostCommand::everywhere(command);
        self
    }

    pub fn build(self) -> Addon {
        self.addon
    }
}

/// Source link for a test repository
pub fn repo_link(name: &str) -> String {
    format!("{}/{}", REPO_BASE, name)
}

/// Clone URL the source control double is asked for
pub fn repo_clone_url(name: &str) -> String {
    format!("{}.git", repo_link(name))
}

/// Catalog document holding `addons`
pub fn catalog(addons: Vec<Addon>) -> Manifest {
    Manifest {
        addons,
        ..Default::default()
    }
}

/// Serialized catalog document
pub fn catalog_json(addons: Vec<Addon>) -> String {
    serde_json::to_string(&catalog(addons)).expect("catalog serializes")
}

/// Serialized catalog that also references other remotes
pub fn catalog_json_with_remotes(addons: Vec<Addon>, remotes: &[&str]) -> String {
    let mut manifest = catalog(addons);
    manifest.remotes = remotes.iter().map(|r| r.to_string()).collect();
    serde_json::to_string(&manifest).expect("catalog serializes")
}
