use super::types::{Article, RawItem};
use crate::classify::{extract_cves, generate_tags, Classifier};
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_TITLE_CHARS: usize = 500;
pub const MAX_CONTENT_CHARS: usize = 10_000;
pub const MAX_SUMMARY_CHARS: usize = 300;

static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!\[CDATA\[|\]\]>").expect("valid CDATA pattern"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid markup pattern"));

/// Strip CDATA markers and markup from a description, then trim.
pub fn sanitize_description(raw: &str) -> String {
    let without_cdata = CDATA_RE.replace_all(raw, "");
    TAG_RE.replace_all(&without_cdata, "").trim().to_string()
}

/// First `max` characters of `s` (not bytes).
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Turns raw feed items into classified articles.
#[derive(Debug, Clone, Default)]
pub struct ArticleExtractor {
    classifier: Classifier,
}

impl ArticleExtractor {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Returns `None` when the item has no usable title; every other field is optional.
    pub fn extract(&self, item: &RawItem, source_name: &str) -> Option<Article> {
        let title = item.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let link = item.link.as_deref().map(str::trim).unwrap_or_default();
        let description = item
            .description
            .as_deref()
            .map(sanitize_description)
            .unwrap_or_default();

        // Classification sees the untruncated text.
        let category = self.classifier.categorize(title, &description);
        let severity = self.classifier.determine_severity(title, &description);
        let cves = extract_cves(&format!("{} {}", title, description));
        let tags = generate_tags(title);

        Some(Article {
            title: truncate_chars(title, MAX_TITLE_CHARS),
            content: truncate_chars(&description, MAX_CONTENT_CHARS),
            summary: truncate_chars(&description, MAX_SUMMARY_CHARS),
            category_slug: category.to_string(),
            severity: severity.to_string(),
            tags,
            source_url: link.to_string(),
            source_name: source_name.to_string(),
            cves,
            vendors: Vec::new(),
            skip_enrichment: false,
        })
    }
}
