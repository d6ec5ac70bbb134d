pub mod client;
pub mod envelope;
pub mod sign;

pub use client::WebhookClient;
pub use envelope::WebhookEnvelope;
pub use sign::WebhookSigner;

use crate::feed::Article;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Result of an HTTP exchange with the receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Counted as delivered. `http_status` is `None` for dry runs.
    Accepted {
        http_status: Option<StatusCode>,
        receiver_status: Option<String>,
    },
    /// Non-2xx response, reported only when `reject_on_http_error` is set.
    Rejected { http_status: StatusCode, body: String },
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// `Err` means the article was not delivered (transport failure).
    async fn publish(&self, article: &Article) -> Result<Delivery>;
}
