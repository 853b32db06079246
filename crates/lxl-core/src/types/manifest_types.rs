//! Catalog document types

use super::addon_types::{Addon, FileArtifact, Origin};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Editor release entry carried by catalogs for client compatibility
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiteXlClient {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_version: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileArtifact>,
}

/// Catalog document (`manifest.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub addons: Vec<Addon>,

    /// Further catalogs referenced by this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remotes: Vec<String>,

    #[serde(default, rename = "lite-xls", skip_serializing_if = "Vec::is_empty")]
    pub lite_xls: Vec<LiteXlClient>,
}

impl Manifest {
    /// Decode a catalog and stamp every addon with the location it came from
    pub fn from_slice(bytes: &[u8], origin: &Origin) -> Result<Self> {
        let mut manifest: Manifest = serde_json::from_slice(bytes)?;
        for addon in &mut manifest.addons {
            addon.origin = Some(origin.clone());
        }
        Ok(manifest)
    }

    /// Find an addon by identifier
    pub fn find(&self, id: &str) -> Option<&Addon> {
        self.addons.iter().find(|addon| addon.id == id)
    }

    /// Number of addons of each type, in `AddonType::ALL` order
    pub fn count_by_type(&self) -> Vec<(super::AddonType, usize)> {
        super::AddonType::ALL
            .into_iter()
            .map(|t| {
                (
                    t,
                    self.addons.iter().filter(|a| a.addon_type == t).count(),
                )
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}
