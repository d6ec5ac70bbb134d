use crate::classify::{Classifier, KeywordTable};
use crate::feed::FeedSource;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub feeds: Vec<FeedSource>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_url")]
    pub url: String,
    /// Prefer `WEBHOOK_SECRET` in the environment or `.env`.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_workflow_id")]
    pub workflow_id: String,
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    /// Report non-2xx receiver responses as rejected instead of delivered.
    #[serde(default)]
    pub reject_on_http_error: bool,
}

fn default_webhook_url() -> String {
    "http://localhost:8080/v1/webhooks/n8n".to_string()
}
fn default_workflow_id() -> String {
    "rss-fetcher".to_string()
}
fn default_signature_header() -> String {
    "X-Signature".to_string()
}
fn default_timeout_s() -> u64 {
    30
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: default_webhook_url(),
            secret: None,
            workflow_id: default_workflow_id(),
            signature_header: default_signature_header(),
            timeout_s: default_timeout_s(),
            reject_on_http_error: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
}

fn default_user_agent() -> String {
    "ACI-RSS-Fetcher/1.0".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_s: default_timeout_s(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// How many feed fetches may be in flight while earlier feeds publish.
    /// 1 keeps the run strictly sequential.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

fn default_fetch_concurrency() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

/// Optional replacements for the built-in keyword tables.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    pub categories: Option<KeywordTable>,
    pub severities: Option<KeywordTable>,
}

impl ClassifierConfig {
    pub fn build(&self) -> Classifier {
        Classifier::new(
            self.categories
                .clone()
                .unwrap_or_else(KeywordTable::default_categories),
            self.severities
                .clone()
                .unwrap_or_else(KeywordTable::default_severities),
        )
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.fetch_concurrency == 0 {
            anyhow::bail!("pipeline.fetch_concurrency must be at least 1");
        }
        for table in [&self.classifier.categories, &self.classifier.severities]
            .into_iter()
            .flatten()
        {
            for rule in &table.rules {
                if rule.label.is_empty() {
                    anyhow::bail!("classifier rules must have a non-empty label");
                }
                // An empty keyword is a substring of every text.
                if rule.keywords.iter().any(|kw| kw.trim().is_empty()) {
                    anyhow::bail!("classifier rule '{}' has an empty keyword", rule.label);
                }
            }
        }
        Ok(())
    }

    /// Load `KEY=VALUE` lines from `.env`. Real env vars take precedence.
    pub fn load_env_file() {
        let Ok(content) = std::fs::read_to_string(ENV_FILE) else {
            return;
        };
        for (key, value) in parse_env(&content) {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// `WEBHOOK_URL` in the environment overrides the file.
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = non_empty_env("WEBHOOK_URL") {
            self.webhook.url = url;
        }
    }

    /// Shared signing secret: `WEBHOOK_SECRET`, then `webhook.secret` from the file.
    pub fn webhook_secret(&self) -> Result<String> {
        resolve_secret(non_empty_env("WEBHOOK_SECRET"), self.webhook.secret.as_deref())
    }
}

/// Non-comment `KEY=VALUE` pairs, with surrounding quotes removed from values.
fn parse_env(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches(['"', '\''])))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_secret(from_env: Option<String>, from_file: Option<&str>) -> Result<String> {
    from_env
        .or_else(|| from_file.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .context("webhook secret not configured: set WEBHOOK_SECRET or webhook.secret")
}
