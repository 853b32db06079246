//! Catalog aggregation across subscribed remotes
//!
//! Remotes are fetched concurrently. A failing remote is reported and
//! skipped; only when every remote fails does aggregation fail. When the
//! same identifier is offered by several remotes the first one wins.

use crate::catalog;
use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::remote::contains_remote;
use futures::stream::{FuturesUnordered, StreamExt};
use lxl_core::types::Manifest;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of aggregating every subscribed remote
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    /// Merged catalog, one entry per identifier
    pub manifest: Manifest,

    /// Remotes referenced by catalogs but not subscribed to
    pub discovered: Vec<String>,

    /// Remotes that could not be fetched or parsed, with the reason
    pub failures: Vec<(String, String)>,
}

/// Fetches and merges remote catalogs
pub struct CatalogAggregator {
    fetcher: Arc<dyn Fetcher>,
}

impl CatalogAggregator {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch every remote and merge the results
    pub async fn aggregate(&self, remotes: &[String]) -> Result<Aggregate> {
        let fetcher = self.fetcher.as_ref();
        let mut tasks: FuturesUnordered<_> = remotes
            .iter()
            .enumerate()
            .map(|(index, remote)| async move {
                (index, remote, catalog::fetch_manifest(fetcher, remote).await)
            })
            .collect();

        let mut fetched = Vec::new();
        let mut failures = Vec::new();
        while let Some((index, remote, result)) = tasks.next().await {
            match result {
                Ok(manifest) => fetched.push((index, manifest)),
                Err(e) => {
                    warn!("Error with remote {}: {}", remote, e);
                    failures.push((remote.clone(), e.to_string()));
                }
            }
        }

        if failures.len() == remotes.len() {
            return Err(Error::NoValidRemote);
        }

        // Merge in subscription order so precedence does not depend on
        // which remote answered first
        fetched.sort_by_key(|(index, _)| *index);

        let mut merged = Manifest::default();
        let mut discovered: Vec<String> = Vec::new();
        for (_, manifest) in fetched {
            for referenced in manifest.remotes {
                match contains_remote(remotes, &referenced) {
                    Ok(true) => {}
                    Ok(false) if !discovered.contains(&referenced) => {
                        info!("Found new remote: {}", referenced);
                        discovered.push(referenced.clone());
                    }
                    Ok(false) => {}
                    Err(e) => debug!("Ignoring remote {}: {}", referenced, e),
                }
                if !merged.remotes.contains(&referenced) {
                    merged.remotes.push(referenced);
                }
            }
            merged.addons.extend(manifest.addons);
            merged.lite_xls.extend(manifest.lite_xls);
        }

        let mut seen = HashSet::new();
        let before = merged.addons.len();
        merged.addons.retain(|addon| seen.insert(addon.id.clone()));
        debug!(
            "Aggregated {} addons from {} remotes ({} duplicates dropped)",
            merged.addons.len(),
            remotes.len() - failures.len(),
            before - merged.addons.len()
        );

        Ok(Aggregate {
            manifest: merged,
            discovered,
            failures,
        })
    }
}
