use crate::feed::Article;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

pub const EVENT_ARTICLE_CREATED: &str = "article.created";

#[derive(Debug, Serialize)]
pub struct EnvelopeMetadata {
    pub workflow_id: String,
    pub execution_id: String,
    pub timestamp: String,
}

/// Payload delivered to the webhook. Built fresh for every article.
#[derive(Debug, Serialize)]
pub struct WebhookEnvelope<'a> {
    pub event_type: &'static str,
    pub data: &'a Article,
    pub metadata: EnvelopeMetadata,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl<'a> WebhookEnvelope<'a> {
    /// `execution_id` and `timestamp` are read from the clock separately and
    /// may differ by a few microseconds.
    pub fn new(article: &'a Article, workflow_id: &str) -> Self {
        Self {
            event_type: EVENT_ARTICLE_CREATED,
            data: article,
            metadata: EnvelopeMetadata {
                workflow_id: workflow_id.to_string(),
                execution_id: now_iso(),
                timestamp: now_iso(),
            },
        }
    }

    /// The exact bytes that get signed and sent.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("failed to serialize webhook envelope")
    }
}
