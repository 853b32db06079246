//! Shared utility functions for lxl crates

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding the config root
pub const CONFIG_DIR_ENV: &str = "LXL_CONFIG_DIR";

/// Environment variable Lite XL itself uses for its user directory
pub const LITE_USERDIR_ENV: &str = "LITE_USERDIR";

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// tests and wrappers can redirect it.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or(Error::NoConfigRoot)
}

/// Resolve the Lite XL config root every addon is installed under
///
/// Priority:
/// 1. `LXL_CONFIG_DIR`
/// 2. `LITE_USERDIR`
/// 3. `$HOME/.config/lite-xl`
pub fn config_root() -> Result<PathBuf> {
    for var in [CONFIG_DIR_ENV, LITE_USERDIR_ENV] {
        if let Ok(dir) = std::env::var(var) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
    }

    Ok(get_home_dir()?.join(".config").join("lite-xl"))
}
