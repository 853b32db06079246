//! Source links and version control fetches
//!
//! A source link is a repository URL with an optional `:<ref>` suffix, e.g.
//! `https://github.com/user/plugin:v1.2`. `latest` and `last` mean the
//! default branch.

use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{debug, info};

static SOURCE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://\S+?/([\w\-\.]+))(?::([\w\-\.]+))?$").expect("source link regex is valid")
});

/// Refs that select the default branch
pub const LATEST_REFS: [&str; 2] = ["latest", "last"];

/// Parsed source link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    /// Clone URL, always ending in `.git`
    pub repo: String,

    /// Ref to check out after cloning; `None` keeps the default branch
    pub reference: Option<String>,
}

/// Parse a source link
pub fn parse_source_link(link: &str) -> Result<SourceLink> {
    let captures = SOURCE_LINK_RE
        .captures(link)
        .ok_or_else(|| Error::MalformedLink {
            link: link.to_string(),
        })?;

    let mut repo = captures[1].to_string();
    match Path::new(&captures[2]).extension() {
        None => repo.push_str(".git"),
        Some(ext) if ext == "git" => {}
        Some(_) => {
            return Err(Error::UnsupportedExtension {
                link: link.to_string(),
            })
        }
    }

    let reference = captures
        .get(3)
        .map(|m| m.as_str())
        .filter(|r| !LATEST_REFS.contains(r))
        .map(str::to_string);

    Ok(SourceLink { repo, reference })
}

/// Fetches a repository tree into a directory
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Populate `dest` with the tree named by `link`
    async fn fetch(&self, link: &SourceLink, dest: &Path) -> Result<()>;
}

/// Source control through the `git` executable
#[derive(Debug, Clone, Default)]
pub struct GitCli;

#[async_trait]
impl SourceControl for GitCli {
    async fn fetch(&self, link: &SourceLink, dest: &Path) -> Result<()> {
        info!("Cloning {} -> {}", link.repo, dest.display());

        let output = Command::new("git")
            .arg("clone")
            .arg("--quiet")
            .arg(&link.repo)
            .arg(dest)
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Clone {
                repo: link.repo.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if let Some(reference) = &link.reference {
            debug!("Running: git checkout {}", reference);
            let output = Command::new("git")
                .current_dir(dest)
                .args(["checkout", "--quiet", reference])
                .output()
                .await?;

            if !output.status.success() {
                return Err(Error::Checkout {
                    reference: reference.clone(),
                    message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                });
            }
        }

        Ok(())
    }
}
