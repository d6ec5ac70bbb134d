use regex::Regex;
use std::sync::LazyLock;

pub const MAX_TAGS: usize = 5;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "in", "on", "at", "for", "to", "of", "and", "or", "with", "by", "from",
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{4,}\b").expect("valid word pattern"));

/// First five lowercase words of 4+ letters that are not stop words, in title order.
pub fn generate_tags(title: &str) -> Vec<String> {
    let lowered = title.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(w))
        .take(MAX_TAGS)
        .map(str::to_string)
        .collect()
}
