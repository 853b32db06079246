//! Discovery of addons already present under the config root

use crate::error::Result;
use lxl_core::types::AddonType;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An addon found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledAddon {
    /// File or directory name without extension
    pub id: String,
    pub addon_type: AddonType,
    pub path: PathBuf,
}

/// Scan every installable type folder under `root`
///
/// Missing folders are skipped. Results are sorted by type then identifier.
pub fn scan(root: &Path) -> Result<Vec<InstalledAddon>> {
    let mut found = Vec::new();

    for addon_type in AddonType::INSTALLABLE {
        let folder = root.join(addon_type.folder());
        let entries = match std::fs::read_dir(&folder) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Skipping missing folder {:?}", folder);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let mut in_folder = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let Some(stem) = path.file_stem() else {
                continue;
            };
            in_folder.push(InstalledAddon {
                id: stem.to_string_lossy().into_owned(),
                addon_type,
                path,
            });
        }
        in_folder.sort_by(|a, b| a.id.cmp(&b.id));
        found.extend(in_folder);
    }

    Ok(found)
}

/// Installed entries whose identifier is exactly `id`
pub fn find(root: &Path, id: &str) -> Result<Vec<InstalledAddon>> {
    Ok(scan(root)?.into_iter().filter(|a| a.id == id).collect())
}
