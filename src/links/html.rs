// src/links/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// For every <a href="..."> on a page we:
// 1. Skip hrefs with a protocol we can't fetch (mailto:, javascript:, #...)
// 2. Resolve the href against the page URL (relative -> absolute)
// 3. Normalize it into a CanonicalUrl
// 4. Drop social media links, static assets and non-http(s) links
// 5. Keep the rest, and flag the ones matching the document pattern
//
// We also pull the text out of <script type="application/json"> blocks so
// the JSON extractor can look for links hidden in there.
// =============================================================================

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::OnceLock;
use url::Url;

use super::filters::{is_excluded_asset, is_excluded_protocol, is_http_scheme, is_social_media};
use super::normalize::{canonicalize, CanonicalUrl};

/// Links found in the anchors of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// Every surviving anchor target
    pub anchor_links: BTreeSet<CanonicalUrl>,
    /// The subset of `anchor_links` matching the document pattern
    pub document_links: BTreeSet<CanonicalUrl>,
}

// Both selectors are constants, so parsing them can only fail if we
// typed them wrong. That's a programmer error, hence expect().
fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("valid anchor selector"))
}

fn json_script_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| {
        Selector::parse(r#"script[type="application/json"]"#).expect("valid script selector")
    })
}

// Extracts all anchor links from HTML content
//
// Parameters:
//   base: the URL of the page (for resolving relative links)
//   html: the HTML content to parse
//   document_pattern: case-insensitive regex that marks document links
//
// Example:
//   html = "<a href='/report.pdf'>Report</a>"
//   base = "https://example.com/ir"
//   anchor_links = document_links = ["https://example.com/report.pdf"]
pub fn extract_page_links(base: &Url, html: &str, document_pattern: &Regex) -> PageLinks {
    let document = Html::parse_document(html);
    links_from_document(&document, base, document_pattern)
}

// Same as extract_page_links() but on an already-parsed document, so the
// fetch worker only parses each page once
pub fn links_from_document(document: &Html, base: &Url, document_pattern: &Regex) -> PageLinks {
    let mut links = PageLinks::default();

    for element in document.select(anchor_selector()) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(url) = resolve_href(base, href) {
            if document_pattern.is_match(url.as_str()) {
                links.document_links.insert(url.clone());
            }
            links.anchor_links.insert(url);
        }
    }

    links
}

// Returns the raw text of every <script type="application/json"> block
pub fn json_script_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    json_blocks_from_document(&document)
}

pub fn json_blocks_from_document(document: &Html) -> Vec<String> {
    document
        .select(json_script_selector())
        .map(|script| script.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

// Resolves one href into a CanonicalUrl we want to keep
//
// Returns None for anything filtered out along the way.
fn resolve_href(base: &Url, href: &str) -> Option<CanonicalUrl> {
    if is_excluded_protocol(href) {
        return None;
    }

    // join() handles both absolute hrefs and relative ones ("../x", "/x", "x")
    let absolute = base.join(href.trim()).ok()?;
    if !is_http_scheme(&absolute) {
        return None;
    }

    let canonical = canonicalize(&absolute);
    if is_social_media(canonical.as_str()) || is_excluded_asset(canonical.as_str()) {
        return None;
    }

    Some(canonical)
}
