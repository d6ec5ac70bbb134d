use serde::Deserialize;

/// One label and the keywords that select it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct KeywordRule {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Ordered first-match table. Rule order is match precedence, so this is a
/// `Vec` and never a map.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct KeywordTable {
    pub rules: Vec<KeywordRule>,
    pub fallback: String,
}

impl KeywordTable {
    /// Return the label of the first rule with any keyword contained in
    /// `text`, or the fallback. `text` must already be lowercase.
    pub fn classify(&self, text: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| text.contains(kw.as_str())))
            .map_or(self.fallback.as_str(), |rule| rule.label.as_str())
    }

    /// Lowercase every keyword so `classify` can compare against lowercased text.
    pub(crate) fn normalized(mut self) -> Self {
        for rule in &mut self.rules {
            for kw in &mut rule.keywords {
                *kw = kw.to_lowercase();
            }
        }
        self
    }

    fn from_static(rules: &[(&str, &[&str])], fallback: &str) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|(label, keywords)| KeywordRule {
                    label: label.to_string(),
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
            fallback: fallback.to_string(),
        }
    }

    pub fn default_categories() -> Self {
        Self::from_static(CATEGORY_RULES, DEFAULT_CATEGORY)
    }

    pub fn default_severities() -> Self {
        Self::from_static(SEVERITY_RULES, DEFAULT_SEVERITY)
    }
}

pub const DEFAULT_CATEGORY: &str = "industry-news";
pub const DEFAULT_SEVERITY: &str = "medium";

const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "vulnerabilities",
        &["vulnerability", "cve", "exploit", "zero-day", "patch", "security flaw", "bug"],
    ),
    (
        "ransomware",
        &["ransomware", "lockbit", "blackcat", "alphv", "conti", "ransom"],
    ),
    (
        "data-breaches",
        &["breach", "leak", "exposed", "compromised", "stolen data"],
    ),
    (
        "malware",
        &["malware", "trojan", "virus", "backdoor", "rat", "infostealer", "botnet"],
    ),
    (
        "phishing",
        &["phishing", "scam", "social engineering", "bec", "email attack"],
    ),
    (
        "threat-actors",
        &["apt", "threat actor", "hacker group", "nation-state", "lazarus", "apt29"],
    ),
    ("compliance", &["compliance", "regulation", "gdpr", "hipaa", "pci"]),
];

const SEVERITY_RULES: &[(&str, &[&str])] = &[
    (
        "critical",
        &["critical", "urgent", "emergency", "zero-day", "actively exploited", "rce"],
    ),
    ("high", &["high", "severe", "major", "important", "exploit"]),
    ("low", &["low", "minor", "informational"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_category_order() {
        let table = KeywordTable::default_categories();
        let labels: Vec<_> = table.rules.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "vulnerabilities",
                "ransomware",
                "data-breaches",
                "malware",
                "phishing",
                "threat-actors",
                "compliance"
            ]
        );
        assert_eq!(table.fallback, "industry-news");
    }

    #[test]
    fn test_first_rule_wins_over_later_stronger_match() {
        // "patch" is a weak vulnerabilities keyword, "ransomware" is the
        // strongest ransomware keyword; declaration order decides.
        let table = KeywordTable::default_categories();
        assert_eq!(table.classify("ransomware gang ships patch"), "vulnerabilities");
    }

    #[test]
    fn test_no_match_returns_fallback() {
        let table = KeywordTable::default_severities();
        assert_eq!(table.classify("quarterly earnings call"), "medium");
        assert_eq!(table.classify(""), "medium");
    }

    #[test]
    fn test_normalized_lowercases_keywords() {
        let table = KeywordTable {
            rules: vec![KeywordRule {
                label: "cloud".to_string(),
                keywords: vec!["AWS".to_string()],
            }],
            fallback: "other".to_string(),
        }
        .normalized();
        assert_eq!(table.classify("new aws region"), "cloud");
    }
}
