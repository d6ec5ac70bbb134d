pub mod extract;
pub mod http;
pub mod parse;
pub mod types;

pub use extract::ArticleExtractor;
pub use http::HttpFeedFetcher;
pub use types::{Article, FeedSource, RawItem};

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch one feed and return its items in document order.
    async fn fetch(&self, url: &str) -> Result<Vec<RawItem>>;
}
