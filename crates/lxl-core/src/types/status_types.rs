//! Persisted subscription state (`<configRoot>/lxl/status.toml`)

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Host serving raw repository files
pub const GITHUB_RAW_HOST: &str = "raw.githubusercontent.com";

/// Repository hosting web UI host
pub const GITHUB_HOST: &str = "github.com";

/// Prefix shared by the official Lite XL catalogs
pub const OFFICIAL_ENDPOINT: &str = "https://raw.githubusercontent.com/lite-xl/";

const DEFAULT_REPOSITORIES: [&str; 3] = ["lite-xl-plugins", "lite-xl-lsp-servers", "lite-xl-ide"];
const DEFAULT_MANIFEST_SUFFIX: &str = "/master/manifest.json";

/// Subscribed remotes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubscriptionState {
    /// Catalog URLs, in subscription order
    #[serde(default)]
    pub remotes: Vec<String>,
}

impl SubscriptionState {
    /// Built-in remotes used on first run
    pub fn default_remotes() -> Vec<String> {
        DEFAULT_REPOSITORIES
            .iter()
            .map(|repo| format!("{}{}{}", OFFICIAL_ENDPOINT, repo, DEFAULT_MANIFEST_SUFFIX))
            .collect()
    }

    /// Read the state file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading subscription state from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Write the state file, creating its directory when needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string(self)?)?;
        debug!("Saved {} remotes to {:?}", self.remotes.len(), path);
        Ok(())
    }
}

impl Default for SubscriptionState {
    fn default() -> Self {
        Self {
            remotes: Self::default_remotes(),
        }
    }
}
