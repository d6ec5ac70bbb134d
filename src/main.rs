use anyhow::Result;
use rss_ingest::config::Config;
use rss_ingest::feed::{ArticleExtractor, HttpFeedFetcher};
use rss_ingest::pipeline::Pipeline;
use rss_ingest::webhook::{WebhookClient, WebhookSigner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rss_ingest=info")),
        )
        .init();

    let dry_run = std::env::args().any(|arg| arg == "--dry-run");
    let config_path = std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    // Load saved secrets from .env (real env vars take precedence)
    Config::load_env_file();

    let mut config = Config::load(&config_path)?;
    config.apply_env_overrides();
    let secret = config.webhook_secret()?;

    println!();
    println!("  RSS Ingest v{}", env!("CARGO_PKG_VERSION"));
    println!("  ================");
    println!("  Webhook URL: {}", config.webhook.url);
    println!("  Feeds to process: {}", config.feeds.len());
    if dry_run {
        println!("  ** DRY RUN ** (envelopes are signed but not sent)");
    }
    println!();

    if config.feeds.is_empty() {
        tracing::warn!(config = %config_path.display(), "no feeds configured");
    }

    let fetcher = HttpFeedFetcher::new(&config.fetch)?;
    let publisher =
        WebhookClient::new(&config.webhook, WebhookSigner::new(&secret)?)?.with_dry_run(dry_run);
    let extractor = ArticleExtractor::new(config.classifier.build());

    let pipeline = Pipeline::new(
        config.feeds.clone(),
        Arc::new(fetcher),
        extractor,
        Box::new(publisher),
    )
    .with_fetch_concurrency(config.pipeline.fetch_concurrency);

    let stats = pipeline.run().await;

    println!();
    println!(
        "  Summary: {}/{} articles posted successfully",
        stats.success_count, stats.total_articles
    );
    if stats.rejected_count > 0 || stats.failed_count > 0 || stats.feeds_failed > 0 {
        println!(
            "  ({} rejected, {} failed, {} feed(s) unreachable)",
            stats.rejected_count, stats.failed_count, stats.feeds_failed
        );
    }
    println!();

    Ok(if stats.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
