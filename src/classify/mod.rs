// src/classify/mod.rs
// =============================================================================
// This module assigns every discovered link a label from the taxonomy.
//
// How a URL is classified:
// 1. Lower-case it
// 2. If it contains any out-of-scope keyword -> "out of scope" (this always
//    wins, even if a category keyword also matches)
// 3. Otherwise walk the rules in declared order; the first rule with a
//    keyword contained in the URL gives the label
// 4. Nothing matched -> "unclassified"
//
// Classification runs once, after the crawl finished, over the final link
// sets. It never changes anything during the crawl.
//
// Submodules:
// - taxonomy: the rule table and how it's loaded/validated
// =============================================================================

mod taxonomy;

pub use taxonomy::{CategoryRule, Taxonomy};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Label for URLs that hit an out-of-scope keyword
pub const OUT_OF_SCOPE_LABEL: &str = "out of scope";
/// Label for URLs that no keyword matched
pub const UNCLASSIFIED_LABEL: &str = "unclassified";

/// The outcome of classifying one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    OutOfScope,
    /// A label declared in the taxonomy
    Category(&'a str),
    Unclassified,
}

impl<'a> Classification<'a> {
    pub fn label(&self) -> &'a str {
        match self {
            Classification::OutOfScope => OUT_OF_SCOPE_LABEL,
            Classification::Category(label) => *label,
            Classification::Unclassified => UNCLASSIFIED_LABEL,
        }
    }
}

impl Taxonomy {
    // Classifies a single URL
    //
    // Pure and deterministic: same taxonomy + same URL = same answer.
    pub fn classify(&self, url: &str) -> Classification<'_> {
        let lower = url.to_lowercase();

        if self
            .out_of_scope
            .iter()
            .any(|keyword| lower.contains(keyword.as_str()))
        {
            return Classification::OutOfScope;
        }

        self.rules
            .iter()
            .find(|rule| rule.first_match(&lower).is_some())
            .map(|rule| Classification::Category(rule.label.as_str()))
            .unwrap_or(Classification::Unclassified)
    }

    // Classifies every URL and groups them by label
    pub fn classify_all<I, S>(&self, urls: I) -> ClassifiedReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ClassifiedReport::default();
        for url in urls {
            let url = url.as_ref();
            report.insert(self.classify(url).label(), url);
        }
        report
    }
}

/// URLs grouped by classification label
///
/// Labels with no URLs are simply absent. Built once per report and never
/// modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassifiedReport(BTreeMap<String, BTreeSet<String>>);

impl ClassifiedReport {
    fn insert(&mut self, label: &str, url: &str) {
        self.0
            .entry(label.to_string())
            .or_default()
            .insert(url.to_string());
    }

    /// URLs that got `label`, if any did
    pub fn get(&self, label: &str) -> Option<&BTreeSet<String>> {
        self.0.get(label)
    }

    pub fn contains(&self, label: &str, url: &str) -> bool {
        self.get(label).is_some_and(|urls| urls.contains(url))
    }

    /// Number of distinct labels present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of URLs across all labels
    pub fn url_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(label, urls)| (label.as_str(), urls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy(rules: Vec<CategoryRule>) -> Taxonomy {
        Taxonomy::new(vec!["career".to_string(), "privacy".to_string()], rules).unwrap()
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let taxonomy = taxonomy(vec![
            CategoryRule::new("Investor Day", &["investor-day"]),
            CategoryRule::new("Investor Relations", &["investor"]),
        ]);
        assert_eq!(
            taxonomy.classify("https://example.com/events/investor-day-2024"),
            Classification::Category("Investor Day")
        );
        assert_eq!(
            taxonomy.classify("https://example.com/investors").label(),
            "Investor Relations"
        );
    }

    #[test]
    fn test_rule_order_is_load_bearing() {
        // Same rules, general one first: it shadows the specific one
        let taxonomy = taxonomy(vec![
            CategoryRule::new("Investor Relations", &["investor"]),
            CategoryRule::new("Investor Day", &["investor-day"]),
        ]);
        assert_eq!(
            taxonomy.classify("https://example.com/investor-day-2024").label(),
            "Investor Relations"
        );
    }

    #[test]
    fn test_out_of_scope_beats_categories() {
        let taxonomy = taxonomy(vec![CategoryRule::new("Dividends", &["dividend"])]);
        let result = taxonomy.classify("https://example.com/careers/dividend-team");
        assert_eq!(result, Classification::OutOfScope);
        assert_eq!(result.label(), OUT_OF_SCOPE_LABEL);
    }

    #[test]
    fn test_unclassified_and_case_insensitive() {
        let taxonomy = taxonomy(vec![CategoryRule::new("Dividends", &["dividend"])]);
        assert_eq!(
            taxonomy.classify("https://example.com/IR/DIVIDEND-History"),
            Classification::Category("Dividends")
        );
        assert_eq!(
            taxonomy.classify("https://example.com/products"),
            Classification::Unclassified
        );
        assert_eq!(
            taxonomy.classify("https://example.com/PRIVACY"),
            Classification::OutOfScope
        );
    }

    #[test]
    fn test_placeholder_rules_never_match() {
        let taxonomy = taxonomy(vec![
            CategoryRule::new("Placeholder", &[]),
            CategoryRule::new("Anything", &["example"]),
        ]);
        assert!(taxonomy.rules()[0].is_placeholder());
        assert_eq!(
            taxonomy.classify("https://example.com/x").label(),
            "Anything"
        );
    }

    #[test]
    fn test_classify_is_total() {
        let taxonomy = Taxonomy::default();
        let labels = taxonomy.labels();
        for url in ["", "not a url", "https://example.com", "https://example.com/ir/q3.pdf"] {
            let label = taxonomy.classify(url).label();
            assert!(labels.contains(&label), "unexpected label {} for {}", label, url);
        }
    }

    #[test]
    fn test_default_taxonomy_examples() {
        let taxonomy = Taxonomy::default();
        assert_eq!(
            taxonomy.classify("https://example.com/news/release-1").label(),
            "Press Releases"
        );
        assert_eq!(
            taxonomy.classify("https://example.com/investors/investor-day-2024").label(),
            "Investor Day Presentation"
        );
        assert_eq!(
            taxonomy.classify("https://example.com/ir/q3.pdf").label(),
            "Quarterly Results"
        );
        assert_eq!(
            taxonomy.classify("https://example.com/careers/dividend").label(),
            OUT_OF_SCOPE_LABEL
        );
    }

    #[test]
    fn test_classify_all_groups_urls() {
        let taxonomy = taxonomy(vec![
            CategoryRule::new("Dividends", &["dividend"]),
            CategoryRule::new("Reports", &["report"]),
        ]);
        let report = taxonomy.classify_all([
            "https://example.com/dividends",
            "https://example.com/annual-report.pdf",
            "https://example.com/report-2023.pdf",
            "https://example.com/careers",
            "https://example.com/home",
        ]);

        assert_eq!(report.len(), 4);
        assert_eq!(report.url_count(), 5);
        assert_eq!(report.get("Reports").map(BTreeSet::len), Some(2));
        assert!(report.contains(OUT_OF_SCOPE_LABEL, "https://example.com/careers"));
        assert!(report.contains(UNCLASSIFIED_LABEL, "https://example.com/home"));
        assert!(report.get("Nothing").is_none());
    }
}
