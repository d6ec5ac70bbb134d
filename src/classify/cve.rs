use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static CVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CVE-\d{4}-\d+").expect("valid CVE pattern"));

/// Extract CVE identifiers, uppercased and deduplicated.
/// First-appearance order is kept, but callers should treat the result as a set.
pub fn extract_cves(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    CVE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_uppercase())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
