//! Current platform detection
//!
//! Catalog filters name platforms the way Lite XL release assets do
//! (`x86_64-linux`, `aarch64-darwin`, `x86_64-windows`), so a filter matches
//! when it ends with the operating system name.

use std::fmt;

/// Wildcard filter accepted by every platform
pub const ANY_PLATFORM: &str = "*";

/// Operating system and CPU architecture an install runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system name (linux, darwin, windows, ...)
    pub os: String,

    /// CPU architecture (x86_64, aarch64, ...)
    pub arch: String,
}

impl Platform {
    /// Create a platform from explicit names
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the platform this binary runs on
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        Self::new(os, std::env::consts::ARCH)
    }

    /// Check a single filter entry against this platform
    pub fn matches(&self, filter: &str) -> bool {
        filter.is_empty() || filter == ANY_PLATFORM || filter.ends_with(&self.os)
    }

    /// Whether this is a Windows platform
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.arch, self.os)
    }
}
