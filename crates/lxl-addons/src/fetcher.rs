//! Retrieval of catalogs and addon artifacts
//!
//! Everything the engine downloads goes through the [`Fetcher`] trait so the
//! HTTP client can be configured once and swapped out in tests.

use crate::error::{Error, Result};
use async_trait::async_trait;
use lxl_core::config::NetworkConfig;
use std::path::Path;
use tracing::debug;

/// Byte retrieval over HTTP(S)
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the body at `url`, failing on transport errors and non-2xx responses
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client honouring the configured timeout and user agent
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body: body.trim().to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Whether an endpoint names something to download rather than a local path
pub fn is_http(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read an endpoint that is either an HTTP(S) URL or a local file
pub async fn read_endpoint(fetcher: &dyn Fetcher, location: &str) -> Result<Vec<u8>> {
    if is_http(location) {
        fetcher.get(location).await
    } else {
        debug!("Reading {}", location);
        Ok(tokio::fs::read(Path::new(location)).await?)
    }
}
