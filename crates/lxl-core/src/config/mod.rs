//! Runtime configuration

mod loader;
mod runtime;

pub use loader::ConfigLoader;
pub use runtime::{NetworkConfig, RuntimeConfig};
