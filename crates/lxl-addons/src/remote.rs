//! Remote URL handling
//!
//! Remotes are catalog URLs, optionally suffixed with `:<ref>`. Only the
//! latest revision can be subscribed to, so the suffix is accepted as
//! `:latest`/`:last` and then dropped.

use crate::error::{Error, Result};
use crate::vcs::LATEST_REFS;
use lxl_core::types::{GITHUB_HOST, GITHUB_RAW_HOST, OFFICIAL_ENDPOINT};
use url::Url;

/// Split a trailing `:<ref>` off a remote
///
/// The colon only counts when it follows the last `/` and the URL has a
/// path, so schemes and ports are left alone.
pub fn split_ref(reference: &str) -> (&str, Option<&str>) {
    let Some(colon) = reference.rfind(':') else {
        return (reference, None);
    };
    let last_slash = reference.rfind('/').unwrap_or(0);
    let has_path = reference
        .find("://")
        .map(|i| reference[i + 3..].contains('/'))
        .unwrap_or(false);

    let tail = &reference[colon + 1..];
    if colon > last_slash && has_path && !tail.is_empty() {
        (&reference[..colon], Some(tail))
    } else {
        (reference, None)
    }
}

/// Drop a `:latest`/`:last` suffix, rejecting any other ref
pub fn strip_latest_ref(reference: &str) -> Result<&str> {
    match split_ref(reference) {
        (base, None) => Ok(base),
        (base, Some(r)) if LATEST_REFS.contains(&r) => Ok(base),
        (_, Some(r)) => Err(Error::UnsupportedRef {
            reference: r.to_string(),
        }),
    }
}

/// Whether `reference` names one of `remotes`
///
/// Matches on path containment, so a repository URL matches the raw catalog
/// URL subscribed for it. Any `:<ref>` suffix is ignored.
pub fn contains_remote(remotes: &[String], reference: &str) -> Result<bool> {
    let (base, _) = split_ref(reference);
    let url = Url::parse(base).map_err(|e| Error::invalid_remote(reference, e.to_string()))?;
    let path = url.path().trim_end_matches('/');
    if path.is_empty() {
        return Ok(remotes.iter().any(|r| r == base));
    }
    Ok(remotes.iter().any(|r| r.contains(path)))
}

/// Whether a remote is one of the official Lite XL catalogs
pub fn is_official(remote: &str) -> bool {
    remote.starts_with(OFFICIAL_ENDPOINT)
}

/// A remote ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRemote {
    pub url: String,

    /// Host is known to serve raw catalogs, so no lookup fetch is needed
    pub trusted: bool,
}

/// Normalize a user-supplied remote
///
/// GitHub web URLs are rewritten to the raw content host with the `blob/`
/// segment removed.
pub fn normalize(reference: &str) -> Result<NormalizedRemote> {
    let base = strip_latest_ref(reference)?;
    let mut url = Url::parse(base).map_err(|e| Error::invalid_remote(reference, e.to_string()))?;

    let host = url.host_str().map(str::to_lowercase).unwrap_or_default();
    if host == GITHUB_HOST || host == format!("www.{}", GITHUB_HOST) {
        let path = url
            .path()
            .split('/')
            .filter(|segment| *segment != "blob")
            .collect::<Vec<_>>()
            .join("/");
        url.set_host(Some(GITHUB_RAW_HOST))
            .map_err(|e| Error::invalid_remote(reference, e.to_string()))?;
        url.set_path(&path);
        return Ok(NormalizedRemote {
            url: url.to_string(),
            trusted: true,
        });
    }

    Ok(NormalizedRemote {
        url: url.to_string(),
        trusted: host == GITHUB_RAW_HOST,
    })
}
