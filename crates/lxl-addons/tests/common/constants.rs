//! Test constants for lxl-addons tests

#![allow(dead_code)]

/// Operating system every test installs for
pub const TEST_OS: &str = "linux";

/// Architecture every test installs for
pub const TEST_ARCH: &str = "x86_64";

/// Arch filter matching the test platform
pub const TEST_ARCH_FILTER: &str = "x86_64-linux";

/// Arch filter never matching the test platform
pub const FOREIGN_ARCH_FILTER: &str = "x86_64-windows";

/// Path the primary catalog is served from
pub const MANIFEST_PATH: &str = "/manifest.json";

/// Base URL of repositories served by the source control double
pub const REPO_BASE: &str = "https://github.com/lxl-tests";

/// Default addon version
pub const TEST_VERSION: &str = "1.0";
