use super::parse::parse_feed;
use super::types::RawItem;
use super::FeedFetcher;
use crate::config::FetchConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches feed documents over HTTP GET.
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build feed HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<RawItem>> {
        tracing::debug!(url, "fetching feed");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("GET {} returned {}", url, status);
        }

        let body = resp
            .bytes()
            .await
            .with_context(|| format!("failed to read body of {}", url))?;
        let items = parse_feed(&body)
            .with_context(|| format!("failed to parse feed {}", url))?
            .into_items();

        tracing::debug!(url, count = items.len(), "parsed feed");
        Ok(items)
    }
}
