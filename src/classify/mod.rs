//! Keyword classification of article text. Pure functions, no I/O.

pub mod cve;
pub mod tags;
pub mod tables;

pub use cve::extract_cves;
pub use tags::generate_tags;
pub use tables::{KeywordRule, KeywordTable};

/// Category and severity tables, fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct Classifier {
    categories: KeywordTable,
    severities: KeywordTable,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            KeywordTable::default_categories(),
            KeywordTable::default_severities(),
        )
    }
}

impl Classifier {
    pub fn new(categories: KeywordTable, severities: KeywordTable) -> Self {
        Self {
            categories: categories.normalized(),
            severities: severities.normalized(),
        }
    }

    pub fn categorize(&self, title: &str, content: &str) -> &str {
        self.categories.classify(&combined_lower(title, content))
    }

    pub fn determine_severity(&self, title: &str, content: &str) -> &str {
        self.severities.classify(&combined_lower(title, content))
    }
}

fn combined_lower(title: &str, content: &str) -> String {
    format!("{} {}", title, content).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rce_vulnerability_example() {
        let c = Classifier::default();
        let title = "Critical RCE vulnerability in product X";
        assert_eq!(c.categorize(title, ""), "vulnerabilities");
        assert_eq!(c.determine_severity(title, ""), "critical");
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let c = Classifier::default();
        assert_eq!(c.categorize("Quarterly funding roundup", "Startups raised money"), "industry-news");
        assert_eq!(c.determine_severity("Quarterly funding roundup", "Startups raised money"), "medium");
    }

    #[test]
    fn test_content_participates_in_match() {
        let c = Classifier::default();
        assert_eq!(c.categorize("Weekly roundup", "LockBit affiliates arrested"), "ransomware");
    }

    #[test]
    fn test_case_insensitive() {
        let c = Classifier::default();
        assert_eq!(c.categorize("GDPR FINE ISSUED", ""), "compliance");
        assert_eq!(c.determine_severity("MINOR update", ""), "low");
    }

    #[test]
    fn test_substring_match_is_not_word_bound() {
        // "rat" inside "separate" selects malware; "apt" never gets a chance.
        let c = Classifier::default();
        assert_eq!(c.categorize("Two separate APT campaigns", ""), "malware");
    }

    #[test]
    fn test_exploit_is_high_unless_critical_word_present() {
        let c = Classifier::default();
        assert_eq!(c.determine_severity("Researchers publish exploit", ""), "high");
        assert_eq!(c.determine_severity("Urgent: researchers publish exploit", ""), "critical");
    }

    #[test]
    fn test_custom_tables() {
        let categories = KeywordTable {
            rules: vec![KeywordRule {
                label: "cloud".to_string(),
                keywords: vec!["S3 Bucket".to_string()],
            }],
            fallback: "misc".to_string(),
        };
        let c = Classifier::new(categories, KeywordTable::default_severities());
        assert_eq!(c.categorize("Open S3 bucket found", ""), "cloud");
        assert_eq!(c.categorize("Nothing relevant", ""), "misc");
    }
}
