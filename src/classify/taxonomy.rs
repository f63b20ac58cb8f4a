// src/classify/taxonomy.rs
// =============================================================================
// The keyword taxonomy: which label a link gets, based on what its URL
// contains.
//
// A taxonomy is plain data, loaded from JSON:
//
//   {
//     "out_of_scope": ["career", "privacy", ...],
//     "rules": [
//       { "label": "Investor Day Presentation", "keywords": ["investor-day"] },
//       { "label": "Presentations",             "keywords": ["presentation"] },
//       ...
//     ]
//   }
//
// ORDER MATTERS. Rules are tried top to bottom and the first keyword hit
// wins, so a specific rule has to be listed above a general one that shares
// keywords with it. A rule with no keywords never matches; it's a slot kept
// for a category nobody has defined keywords for yet.
//
// A default taxonomy for investor-relations sites is compiled into the binary
// (default_taxonomy.json); a custom one can be loaded from a file at runtime.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TaxonomyError;

use super::{OUT_OF_SCOPE_LABEL, UNCLASSIFIED_LABEL};

const DEFAULT_TAXONOMY: &str = include_str!("default_taxonomy.json");

/// One (label, keywords) entry of the ordered rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<S: Into<String>>(label: S, keywords: &[&str]) -> Self {
        Self {
            label: label.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// A rule with no keywords can never match
    pub fn is_placeholder(&self) -> bool {
        self.keywords.is_empty()
    }

    // First keyword contained in `lower_url`, if any
    pub(super) fn first_match(&self, lower_url: &str) -> Option<&str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .find(|keyword| lower_url.contains(keyword))
    }
}

/// An ordered, validated rule table plus the out-of-scope keyword list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default)]
    pub(super) out_of_scope: Vec<String>,
    #[serde(default)]
    pub(super) rules: Vec<CategoryRule>,
}

impl Taxonomy {
    // Builds a taxonomy from in-memory rules
    //
    // Keywords are lower-cased, and the same validation as for JSON files
    // applies.
    pub fn new(out_of_scope: Vec<String>, rules: Vec<CategoryRule>) -> Result<Self, TaxonomyError> {
        Self {
            out_of_scope,
            rules,
        }
        .validated()
    }

    // Parses and validates a taxonomy from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        let raw: Taxonomy = serde_json::from_str(json)?;
        raw.validated()
    }

    // Loads a taxonomy from a JSON file on disk
    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let text = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn out_of_scope_keywords(&self) -> &[String] {
        &self.out_of_scope
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Every label `classify` can return, in declaration order, followed by
    /// the two sentinels
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.rules.iter().map(|r| r.label.as_str()).collect();
        labels.push(OUT_OF_SCOPE_LABEL);
        labels.push(UNCLASSIFIED_LABEL);
        labels
    }

    fn validated(mut self) -> Result<Self, TaxonomyError> {
        // Matching is done on the lower-cased URL, so keywords must be too
        for keyword in self.out_of_scope.iter_mut() {
            *keyword = keyword.to_lowercase();
            if keyword.is_empty() {
                return Err(TaxonomyError::EmptyKeyword(OUT_OF_SCOPE_LABEL.to_string()));
            }
        }

        for rule in self.rules.iter_mut() {
            rule.label = rule.label.trim().to_string();
            if rule.label.is_empty() {
                return Err(TaxonomyError::EmptyLabel);
            }
            if rule.label == OUT_OF_SCOPE_LABEL || rule.label == UNCLASSIFIED_LABEL {
                return Err(TaxonomyError::ReservedLabel(rule.label.clone()));
            }
            for keyword in rule.keywords.iter_mut() {
                *keyword = keyword.to_lowercase();
                // "" is contained in every string and would swallow the rest
                // of the table
                if keyword.is_empty() {
                    return Err(TaxonomyError::EmptyKeyword(rule.label.clone()));
                }
            }
        }

        Ok(self)
    }
}

impl Default for Taxonomy {
    /// The built-in investor-relations taxonomy
    fn default() -> Self {
        match Self::from_json_str(DEFAULT_TAXONOMY) {
            Ok(taxonomy) => taxonomy,
            // The embedded file is covered by tests; an empty table keeps
            // classification total even if someone breaks it
            Err(e) => {
                tracing::error!(error = %e, "built-in taxonomy is invalid");
                Self {
                    out_of_scope: Vec::new(),
                    rules: Vec::new(),
                }
            }
        }
    }
}
