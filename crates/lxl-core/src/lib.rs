//! # lxl-core
//!
//! Core library for the lxl addon manager providing:
//! - Catalog types (addons, file artifacts, manifests)
//! - Normalisation of the polymorphic wire fields (`arch`, `post`, `type`)
//! - Current platform detection
//! - Config root resolution and runtime configuration loading
//! - Persisted subscription state

pub mod config;
pub mod error;
pub mod platform;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, RuntimeConfig};
pub use error::{Error, Result};
pub use platform::Platform;
pub use utils::{config_root, get_home_dir};
