use super::envelope::WebhookEnvelope;
use super::sign::WebhookSigner;
use super::{Delivery, Publisher};
use crate::config::WebhookConfig;
use crate::feed::Article;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderName, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

/// Signs article envelopes and POSTs them to the webhook endpoint.
pub struct WebhookClient {
    client: Client,
    signer: WebhookSigner,
    url: String,
    workflow_id: String,
    signature_header: HeaderName,
    reject_on_http_error: bool,
    dry_run: bool,
}

impl WebhookClient {
    pub fn new(config: &WebhookConfig, signer: WebhookSigner) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .build()
            .context("failed to build webhook HTTP client")?;
        let signature_header = HeaderName::from_bytes(config.signature_header.as_bytes())
            .with_context(|| format!("invalid signature header name: {}", config.signature_header))?;
        Ok(Self {
            client,
            signer,
            url: config.url.clone(),
            workflow_id: config.workflow_id.clone(),
            signature_header,
            reject_on_http_error: config.reject_on_http_error,
            dry_run: false,
        })
    }

    /// Sign and log envelopes without sending them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// The receiver's `status` field, when the response body is a JSON object carrying one.
fn receiver_status(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("status")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl Publisher for WebhookClient {
    async fn publish(&self, article: &Article) -> Result<Delivery> {
        let envelope = WebhookEnvelope::new(article, &self.workflow_id);
        let body = envelope.to_bytes()?;
        let signature = self.signer.sign(&body);

        if self.dry_run {
            tracing::info!(
                bytes = body.len(),
                signature = %signature,
                "DRY RUN: would post article"
            );
            return Ok(Delivery::Accepted {
                http_status: None,
                receiver_status: None,
            });
        }

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(self.signature_header.clone(), signature)
            .body(body)
            .send()
            .await
            .context("webhook POST failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("failed to read webhook response")?;
        let receiver_status = receiver_status(&text);

        if !status.is_success() {
            if self.reject_on_http_error {
                return Ok(Delivery::Rejected {
                    http_status: status,
                    body: text,
                });
            }
            // Only transport failures count as "not delivered" by default.
            tracing::warn!(
                %status,
                receiver_status = receiver_status.as_deref().unwrap_or("unknown"),
                "webhook returned error status, counting as delivered"
            );
        }

        Ok(Delivery::Accepted {
            http_status: Some(status),
            receiver_status,
        })
    }
}
