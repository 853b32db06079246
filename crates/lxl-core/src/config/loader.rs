//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Built-in defaults
//! 2. User config (`<configRoot>/lxl/config.yaml`)
//! 3. Environment variables (`LXL_*` prefix)

use crate::config::RuntimeConfig;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under the config root owned by lxl
pub const STATE_DIR: &str = "lxl";

/// Loads runtime configuration and locates lxl's own files
pub struct ConfigLoader {
    /// Lite XL config root
    root: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the default config root
    pub fn new() -> Result<Self> {
        Ok(Self::with_root(crate::utils::config_root()?))
    }

    /// Create a loader for a custom config root
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Lite XL config root addons are installed under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding lxl's state, config and scratch space
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Subscription state file
    pub fn status_path(&self) -> PathBuf {
        self.state_dir().join("status.toml")
    }

    /// Parent directory for scratch clones
    pub fn scratch_dir(&self) -> PathBuf {
        self.state_dir().join("tmp")
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = RuntimeConfig::default();

        let path = self.state_dir().join("config.yaml");
        if path.exists() {
            debug!("Loading runtime config from {:?}", path);
            let content = fs::read_to_string(&path)?;
            config = serde_yaml_ng::from_str(&content).map_err(|e| {
                Error::invalid_config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
        }

        Self::apply_env_overrides(config)
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("LXL_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("LXL_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("LXL_USER_AGENT") {
            config.network.user_agent = val;
        }

        Ok(config)
    }
}
