use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::header::USER_AGENT;
use url::Url;

lazy_static! {
    static ref HTTP_CLI: reqwest::Client = reqwest::ClientBuilder::new()
        .gzip(true)
        .deflate(true)
        .build()
        .unwrap();
}

/// Source of raw HTML documents.
#[async_trait(?Send)]
pub trait Fetch: fmt::Debug {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Downloads pages over HTTP with a shared client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait(?Send)]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let resp = HTTP_CLI
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }
}

/// In-memory site: a map from URL to HTML.
///
/// URLs are normalized on both insertion and lookup, so `https://host` and `https://host/`
/// address the same page.
#[derive(Debug, Clone, Default)]
pub struct SiteSnapshot {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
}

impl SiteSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.insert(url, html);
        self
    }

    /// Makes every fetch of `url` take at least `delay`.
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(normalize(url), delay);
        self
    }

    pub fn insert(&mut self, url: &str, html: impl Into<String>) {
        self.pages.insert(normalize(url), html.into());
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(String::from)
        .unwrap_or_else(|_| url.to_owned())
}

#[async_trait(?Send)]
impl Fetch for SiteSnapshot {
    async fn fetch(&self, url: &Url) -> Result<String> {
        if let Some(delay) = self.delays.get(url.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("No page for {url} in snapshot"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_normalizes_urls() {
        let snapshot = SiteSnapshot::new().with_page("https://docs.example.com", "<p>home</p>");
        let url = Url::parse("https://docs.example.com/").unwrap();
        assert_eq!(snapshot.fetch(&url).await.unwrap(), "<p>home</p>");
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_missing_page() {
        let snapshot = SiteSnapshot::new();
        let url = Url::parse("https://docs.example.com/missing").unwrap();
        let err = snapshot.fetch(&url).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "No page for https://docs.example.com/missing in snapshot"
        );
    }
}
