//! Addon management for lxl
//!
//! This crate handles:
//! - Remote catalog fetching and aggregation
//! - Subscription management and remote health checks
//! - Dependency, conflict and replacement resolution
//! - Addon placement (single scripts, directory trees, stub catalogs)
//! - Auxiliary file downloads and post-install commands

pub mod aggregator;
pub mod catalog;
pub mod entry;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod fsops;
pub mod installed;
pub mod locks;
pub mod registry;
pub mod remote;
pub mod resolver;
pub mod vcs;

pub use aggregator::{Aggregate, CatalogAggregator};
pub use error::{Error, Result};
pub use executor::{AddonExecutor, Endpoint, PostInstallHook};
pub use fetcher::{Fetcher, HttpFetcher};
pub use installed::InstalledAddon;
pub use registry::{RemoteHealth, RemoteRegistry};
pub use resolver::{AddonResolver, InstallOutcome, ListedAddon};
pub use vcs::{GitCli, SourceControl, SourceLink};
