// src/links/json.rs
// =============================================================================
// Finds links hidden inside JSON payloads.
//
// Investor-relations and press pages often render their document lists from
// JSON (either an API response or an inline <script type="application/json">
// block). No <a> tag points at those documents, so we walk the JSON value
// tree and treat every string that looks like a URL as a link.
//
// A string "looks like a URL" if it starts with "http" (absolute) or "/"
// (root-relative). Everything else (titles, dates, ids) is ignored.
// =============================================================================

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use url::Url;

use super::filters::{is_http_scheme, is_social_media};
use super::normalize::{canonicalize, CanonicalUrl};

/// How deep the walker descends into nested objects/arrays
///
/// serde_json already refuses to parse deeper documents than this, so the
/// guard only matters for values built in code.
pub const MAX_JSON_DEPTH: usize = 128;

/// Links found in one or more JSON payloads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonLinks {
    pub links: BTreeSet<CanonicalUrl>,
    /// The subset of `links` matching the document pattern
    pub documents: BTreeSet<CanonicalUrl>,
    /// Payloads that failed to decode and were skipped
    pub decode_failures: usize,
}

impl JsonLinks {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    // Folds another set of results into this one
    pub fn merge(&mut self, other: JsonLinks) {
        self.links.extend(other.links);
        self.documents.extend(other.documents);
        self.decode_failures += other.decode_failures;
    }
}

// Calls `visit` for every string in the value tree, depth-first
//
// Object keys are not visited, only values. Returns false if the walk was
// cut short by MAX_JSON_DEPTH.
pub fn walk_strings<F>(value: &Value, visit: &mut F) -> bool
where
    F: FnMut(&str),
{
    walk_at_depth(value, 0, visit)
}

fn walk_at_depth<F>(value: &Value, depth: usize, visit: &mut F) -> bool
where
    F: FnMut(&str),
{
    if depth > MAX_JSON_DEPTH {
        return false;
    }

    match value {
        Value::String(s) => {
            visit(s);
            true
        }
        Value::Array(items) => items
            .iter()
            .fold(true, |complete, item| walk_at_depth(item, depth + 1, visit) && complete),
        Value::Object(map) => map
            .values()
            .fold(true, |complete, item| walk_at_depth(item, depth + 1, visit) && complete),
        Value::Null | Value::Bool(_) | Value::Number(_) => true,
    }
}

// Extracts links from an already-decoded JSON value
//
// Parameters:
//   base: URL the payload came from (root-relative strings resolve against it)
//   payload: the decoded JSON
//   document_pattern: case-insensitive regex that marks document links
pub fn extract_json_links(base: &Url, payload: &Value, document_pattern: &Regex) -> JsonLinks {
    let mut found = JsonLinks::default();

    walk_strings(payload, &mut |candidate| {
        if let Some(url) = resolve_candidate(base, candidate) {
            if document_pattern.is_match(url.as_str()) {
                found.documents.insert(url.clone());
            }
            found.links.insert(url);
        }
    });

    found
}

// Decodes `text` as JSON and extracts links from it
//
// Malformed JSON isn't an error for the page: it just contributes nothing,
// and is counted in `decode_failures`.
pub fn extract_json_text_links(base: &Url, text: &str, document_pattern: &Regex) -> JsonLinks {
    match serde_json::from_str::<Value>(text) {
        Ok(payload) => extract_json_links(base, &payload, document_pattern),
        Err(e) => {
            tracing::debug!(%base, error = %e, "skipping malformed JSON payload");
            JsonLinks {
                decode_failures: 1,
                ..JsonLinks::default()
            }
        }
    }
}

fn resolve_candidate(base: &Url, candidate: &str) -> Option<CanonicalUrl> {
    let candidate = candidate.trim();
    if !(candidate.starts_with("http") || candidate.starts_with('/')) {
        return None;
    }

    let absolute = base.join(candidate).ok()?;
    if !is_http_scheme(&absolute) {
        return None;
    }

    let canonical = canonicalize(&absolute);
    if is_social_media(canonical.as_str()) {
        return None;
    }
    Some(canonical)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is serde_json::Value?
//    - An enum with one variant per JSON type: Null, Bool, Number, String,
//      Array, Object
//    - match on it and the compiler makes sure every JSON type is handled
//
// 2. Why does walk_strings take a closure (FnMut)?
//    - The walk is the same no matter what we do with each string
//    - FnMut (not Fn) because our closure inserts into a set it captured
// -----------------------------------------------------------------------------
