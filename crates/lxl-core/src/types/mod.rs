//! Type definitions for lxl catalogs and state

mod addon_types;
mod manifest_types;
mod status_types;

pub use addon_types::*;
pub use manifest_types::*;
pub use status_types::*;
