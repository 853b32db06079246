//! Catalog retrieval and parsing
//!
//! Every parsed addon is stamped with the location its catalog came from so
//! relative references (`remote`, the default `<folder>/<id>.lua`) can be
//! resolved later.

use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use lxl_core::types::{Manifest, Origin};
use std::path::Path;
use tracing::debug;

/// Name of the catalog document inside a repository
pub const MANIFEST_FILE: &str = "manifest.json";

/// Parse catalog bytes read from `origin`
pub fn parse_manifest(bytes: &[u8], origin: &Origin) -> Result<Manifest> {
    Manifest::from_slice(bytes, origin).map_err(|source| Error::ManifestParse {
        location: origin.to_string(),
        source,
    })
}

/// Fetch and parse a remote catalog
pub async fn fetch_manifest(fetcher: &dyn Fetcher, location: &str) -> Result<Manifest> {
    let origin = Origin::remote(location).map_err(|e| Error::ManifestFetch {
        location: location.to_string(),
        source: Box::new(e.into()),
    })?;

    let bytes = fetcher
        .get(location)
        .await
        .map_err(|e| Error::ManifestFetch {
            location: location.to_string(),
            source: Box::new(e),
        })?;

    let manifest = parse_manifest(&bytes, &origin)?;
    debug!(
        "Parsed {} addons and {} remotes from {}",
        manifest.addons.len(),
        manifest.remotes.len(),
        location
    );
    Ok(manifest)
}

/// Read a catalog from disk; relative references resolve against its directory
pub async fn read_local_manifest(path: &Path) -> Result<Manifest> {
    let bytes = tokio::fs::read(path).await?;
    let dir = path.parent().unwrap_or(Path::new("."));
    parse_manifest(&bytes, &Origin::local(dir))
}
