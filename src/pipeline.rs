use crate::feed::{ArticleExtractor, FeedFetcher, FeedSource, RawItem};
use crate::webhook::{Delivery, Publisher};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Hard cap on items taken from each feed, in document order.
pub const MAX_ITEMS_PER_FEED: usize = 10;

/// Counters for one run. Only `success_count` decides the exit status.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub feeds_processed: usize,
    pub feeds_failed: usize,
    pub items_seen: usize,
    pub items_skipped: usize,
    pub total_articles: usize,
    pub success_count: usize,
    pub rejected_count: usize,
    pub failed_count: usize,
}

impl RunStats {
    pub fn is_success(&self) -> bool {
        self.success_count > 0
    }
}

/// Fetch -> extract -> publish over every configured feed.
pub struct Pipeline {
    feeds: Vec<FeedSource>,
    fetcher: Arc<dyn FeedFetcher>,
    extractor: ArticleExtractor,
    publisher: Box<dyn Publisher>,
    fetch_concurrency: usize,
}

impl Pipeline {
    pub fn new(
        feeds: Vec<FeedSource>,
        fetcher: Arc<dyn FeedFetcher>,
        extractor: ArticleExtractor,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        Self {
            feeds,
            fetcher,
            extractor,
            publisher,
            fetch_concurrency: 1,
        }
    }

    /// Allow up to `n` feed fetches in flight. Feeds are still consumed in
    /// declaration order and items within a feed are always published one at a time.
    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.max(1);
        self
    }

    pub async fn run(&self) -> RunStats {
        let mut stats = RunStats::default();

        if self.fetch_concurrency <= 1 {
            for feed in &self.feeds {
                tracing::info!(feed = %feed.display_name, url = %feed.url, "processing feed");
                let result = self.fetcher.fetch(&feed.url).await;
                self.process_feed(feed, result, &mut stats).await;
            }
        } else {
            // Fetches run as their own tasks so they keep making progress
            // while earlier feeds are still being published.
            let handles = self.spawn_fetches();
            for (feed, handle) in self.feeds.iter().zip(handles) {
                let result = handle
                    .await
                    .unwrap_or_else(|e| Err(anyhow!("fetch task failed: {}", e)));
                self.process_feed(feed, result, &mut stats).await;
            }
        }

        tracing::info!(
            success = stats.success_count,
            total = stats.total_articles,
            rejected = stats.rejected_count,
            failed = stats.failed_count,
            "summary: {}/{} articles posted successfully",
            stats.success_count,
            stats.total_articles
        );
        stats
    }

    /// One task per feed, in declaration order, at most `fetch_concurrency` in flight.
    fn spawn_fetches(&self) -> Vec<JoinHandle<Result<Vec<RawItem>>>> {
        let limit = Arc::new(Semaphore::new(self.fetch_concurrency));
        self.feeds
            .iter()
            .map(|feed| {
                let fetcher = Arc::clone(&self.fetcher);
                let limit = Arc::clone(&limit);
                let name = feed.display_name.clone();
                let url = feed.url.clone();
                tokio::spawn(async move {
                    let _permit = limit
                        .acquire_owned()
                        .await
                        .context("fetch limiter closed")?;
                    tracing::info!(feed = %name, url = %url, "processing feed");
                    fetcher.fetch(&url).await
                })
            })
            .collect()
    }

    async fn process_feed(
        &self,
        feed: &FeedSource,
        result: Result<Vec<RawItem>>,
        stats: &mut RunStats,
    ) {
        let items = match result {
            Ok(items) => items,
            Err(e) => {
                stats.feeds_failed += 1;
                tracing::warn!(feed = %feed.display_name, "failed to fetch feed: {:#}", e);
                return;
            }
        };
        stats.feeds_processed += 1;
        tracing::info!(feed = %feed.display_name, count = items.len(), "found items");

        for item in items.iter().take(MAX_ITEMS_PER_FEED) {
            self.process_item(feed, item, stats).await;
        }
    }

    async fn process_item(&self, feed: &FeedSource, item: &RawItem, stats: &mut RunStats) {
        stats.items_seen += 1;
        let Some(article) = self.extractor.extract(item, &feed.display_name) else {
            stats.items_skipped += 1;
            tracing::debug!(feed = %feed.display_name, "skipping item without title");
            return;
        };
        stats.total_articles += 1;

        let title: String = article.title.chars().take(60).collect();
        match self.publisher.publish(&article).await {
            Ok(Delivery::Accepted { receiver_status, .. }) => {
                stats.success_count += 1;
                tracing::info!(
                    title = %title,
                    category = %article.category_slug,
                    severity = %article.severity,
                    status = receiver_status.as_deref().unwrap_or("unknown"),
                    "posted article"
                );
            }
            Ok(Delivery::Rejected { http_status, body }) => {
                stats.rejected_count += 1;
                tracing::warn!(title = %title, %http_status, body = %body, "webhook rejected article");
            }
            Err(e) => {
                stats.failed_count += 1;
                tracing::warn!(title = %title, "error posting article: {:#}", e);
            }
        }
    }
}
