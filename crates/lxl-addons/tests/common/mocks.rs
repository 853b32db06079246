//! Test doubles
//!
//! - [`FakeSourceControl`] fills clone destinations from in-memory trees
//! - wiremock helpers for serving catalogs and addon files, optionally
//!   conditioned on filesystem state

#![allow(dead_code)]

use async_trait::async_trait;
use lxl_addons::{Error, Result, SourceControl, SourceLink};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Source control double serving registered trees
#[derive(Default)]
pub struct FakeSourceControl {
    trees: HashMap<String, Vec<(String, String)>>,
    calls: Mutex<Vec<(SourceLink, PathBuf)>>,
}

impl FakeSourceControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the files a clone of `repo` produces
    pub fn with_tree(mut self, repo: &str, files: &[(&str, &str)]) -> Self {
        self.trees.insert(
            repo.to_string(),
            files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
        );
        self
    }

    /// Every fetch made so far
    pub fn calls(&self) -> Vec<(SourceLink, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceControl for FakeSourceControl {
    async fn fetch(&self, link: &SourceLink, dest: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((link.clone(), dest.to_path_buf()));

        let files = self.trees.get(&link.repo).ok_or_else(|| Error::Clone {
            repo: link.repo.clone(),
            message: "repository not found".to_string(),
        })?;

        std::fs::create_dir_all(dest)?;
        for (rel, content) in files {
            let target = dest.join(rel);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, content)?;
        }
        Ok(())
    }
}

/// Serve `body` at `route`
pub async fn mock_body(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serve `body` at `route`, expecting exactly `times` requests
pub async fn mock_body_expect(server: &MockServer, route: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Serve `body` at `route` once, failing with 409 while `blocker` exists
pub async fn mock_body_unless_exists(
    server: &MockServer,
    route: &str,
    body: &str,
    blocker: PathBuf,
) {
    let body = body.to_string();
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(move |_: &Request| {
            if blocker.symlink_metadata().is_ok() {
                ResponseTemplate::new(409)
            } else {
                ResponseTemplate::new(200).set_body_string(body.clone())
            }
        })
        .expect(1)
        .mount(server)
        .await;
}

/// Answer `route` with a server error
pub async fn mock_failure(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
