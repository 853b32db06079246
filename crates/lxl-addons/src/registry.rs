//! Subscription registry
//!
//! Owns the list of subscribed remotes, persists it to `status.toml`, and
//! caches the aggregated catalog for the lifetime of the process.

use crate::aggregator::{Aggregate, CatalogAggregator};
use crate::catalog;
use crate::error::{Error, Result};
use crate::fetcher::Fetcher;
use crate::remote::{self, contains_remote};
use futures::stream::{FuturesUnordered, StreamExt};
use lxl_core::types::{AddonType, Manifest, SubscriptionState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Reachability report for one subscribed remote
#[derive(Debug, Clone)]
pub struct RemoteHealth {
    pub url: String,
    pub official: bool,

    /// Addon counts per type, or why the remote is broken
    pub status: std::result::Result<Vec<(AddonType, usize)>, String>,
}

impl RemoteHealth {
    pub fn is_broken(&self) -> bool {
        self.status.is_err()
    }
}

/// Subscribed remotes and the catalog they aggregate to
pub struct RemoteRegistry {
    state: SubscriptionState,
    state_path: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    aggregator: CatalogAggregator,
    cache: OnceCell<Aggregate>,
}

impl RemoteRegistry {
    /// Load subscriptions from `state_path`, writing the defaults on first run
    pub fn load(state_path: impl Into<PathBuf>, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let state_path = state_path.into();
        let state = if state_path.exists() {
            SubscriptionState::load(&state_path)?
        } else {
            info!("No subscriptions yet, using the official remotes");
            let state = SubscriptionState::default();
            state.save(&state_path)?;
            state
        };
        Ok(Self::from_state(state, state_path, fetcher))
    }

    /// Build a registry from already loaded state
    pub fn from_state(
        state: SubscriptionState,
        state_path: impl Into<PathBuf>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            state,
            state_path: state_path.into(),
            aggregator: CatalogAggregator::new(fetcher.clone()),
            fetcher,
            cache: OnceCell::new(),
        }
    }

    pub fn remotes(&self) -> &[String] {
        &self.state.remotes
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Whether `reference` is already subscribed
    pub fn has_remote(&self, reference: &str) -> Result<bool> {
        contains_remote(&self.state.remotes, reference)
    }

    /// Aggregated catalog, fetched on first use
    pub async fn catalog(&self) -> Result<&Manifest> {
        Ok(&self.aggregate().await?.manifest)
    }

    /// Remotes referenced by catalogs but not subscribed; empty until the
    /// catalog has been fetched
    pub fn discovered(&self) -> &[String] {
        self.cache
            .get()
            .map(|aggregate| aggregate.discovered.as_slice())
            .unwrap_or(&[])
    }

    async fn aggregate(&self) -> Result<&Aggregate> {
        self.cache
            .get_or_try_init(|| self.aggregator.aggregate(&self.state.remotes))
            .await
    }

    /// Subscribe to a remote and persist the change
    ///
    /// Returns the stored URL. Remotes on hosts not known to serve raw
    /// catalogs are fetched and parsed before being accepted.
    pub async fn subscribe(&mut self, reference: &str) -> Result<String> {
        let normalized = remote::normalize(reference)?;

        if self.state.remotes.contains(&normalized.url) || self.has_remote(reference)? {
            return Err(Error::RemoteExists {
                remote: normalized.url,
            });
        }

        if !normalized.trusted {
            debug!("Validating {}", normalized.url);
            catalog::fetch_manifest(self.fetcher.as_ref(), &normalized.url)
                .await
                .map_err(|e| Error::invalid_remote(reference, e.to_string()))?;
        }

        self.state.remotes.push(normalized.url.clone());
        self.state.save(&self.state_path)?;
        info!("Subscribed to {}", normalized.url);
        Ok(normalized.url)
    }

    /// Remove a subscription and persist the change
    pub fn unsubscribe(&mut self, reference: &str) -> Result<String> {
        let url = remote::normalize(reference)
            .map(|n| n.url)
            .unwrap_or_else(|_| reference.to_string());

        let index = self
            .state
            .remotes
            .iter()
            .position(|r| *r == url || r == reference)
            .ok_or_else(|| Error::RemoteNotFound {
                remote: reference.to_string(),
            })?;

        let removed = self.state.remotes.remove(index);
        self.state.save(&self.state_path)?;
        info!("Unsubscribed from {}", removed);
        Ok(removed)
    }

    /// Fetch every remote and report whether it is usable
    ///
    /// Results arrive in completion order.
    pub async fn remote_health(&self) -> Vec<RemoteHealth> {
        let fetcher = self.fetcher.as_ref();
        let mut tasks: FuturesUnordered<_> = self
            .state
            .remotes
            .iter()
            .map(|url| async move {
                let status = catalog::fetch_manifest(fetcher, url)
                    .await
                    .map(|manifest| manifest.count_by_type())
                    .map_err(|e| e.to_string());
                RemoteHealth {
                    url: url.clone(),
                    official: remote::is_official(url),
                    status,
                }
            })
            .collect();

        let mut reports = Vec::with_capacity(self.state.remotes.len());
        while let Some(report) = tasks.next().await {
            reports.push(report);
        }
        reports
    }
}
