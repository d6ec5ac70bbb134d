use serde::{Deserialize, Serialize};

/// A configured feed. Immutable for the duration of a run.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeedSource {
    pub url: String,
    #[serde(alias = "name")]
    pub display_name: String,
}

/// Sub-fields of one RSS `<item>` or Atom `<entry>`, as found in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
}

/// Normalized, classified record published as `article.created`.
/// Field order here is the key order of the serialized payload.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub category_slug: String,
    pub severity: String,
    pub tags: Vec<String>,
    pub source_url: String,
    pub source_name: String,
    pub cves: Vec<String>,
    /// Reserved for downstream enrichment; never populated here.
    pub vendors: Vec<String>,
    pub skip_enrichment: bool,
}
