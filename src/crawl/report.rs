// src/crawl/report.rs
// =============================================================================
// Collects what every worker found, and builds the final report.
//
// The Aggregator is the only thing that writes to the crawl's result sets.
// Workers hand their PageOutcome to the controller, the controller passes it
// here, one at a time. No locks, no races.
//
// Once the frontier is empty, finish() freezes the sets into a CrawlReport:
// sorted lists, the page -> documents map, the counts, and the two
// classified views (all links, document links).
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::classify::{ClassifiedReport, Taxonomy};
use crate::error::FetchError;
use crate::links::CanonicalUrl;

use super::frontier::FrontierEntry;
use super::worker::PageOutcome;

/// Diagnostic counters. They describe the crawl but never steer it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Pages that came back as 200 + HTML
    pub pages_fetched: usize,
    /// Failed pages, by FetchError::kind()
    pub failures: BTreeMap<String, usize>,
    /// JSON payloads that didn't decode
    pub json_decode_failures: usize,
    /// Queued entries dropped because they were already visited
    pub stale_entries_skipped: usize,
    pub waves: usize,
    /// True if the crawl was stopped before the frontier ran dry
    pub cancelled: bool,
}

impl CrawlStats {
    pub fn failed_pages(&self) -> usize {
        self.failures.values().sum()
    }
}

/// Everything a finished crawl discovered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Every link found, sorted
    pub all_links: Vec<String>,
    /// The links matching the document pattern, sorted
    pub document_links: Vec<String>,
    /// Fetched page -> the documents it links to
    pub pages_with_documents: BTreeMap<String, Vec<String>>,
    /// Number of URLs claimed for fetching (including ones that failed)
    pub pages_crawled: usize,
    /// Distinct links found through JSON payloads
    pub json_links_count: usize,
    pub classified_links: ClassifiedReport,
    pub classified_documents: ClassifiedReport,
    pub stats: CrawlStats,
}

/// Mutable crawl state, owned by the controller
#[derive(Debug, Default)]
pub struct Aggregator {
    all_links: BTreeSet<CanonicalUrl>,
    document_links: BTreeSet<CanonicalUrl>,
    pages_with_documents: BTreeMap<CanonicalUrl, BTreeSet<CanonicalUrl>>,
    json_links: BTreeSet<CanonicalUrl>,
    stats: CrawlStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    // Folds one worker's outcome into the result sets
    //
    // Returns the frontier entries the page produced; the controller decides
    // which of them still need queueing.
    pub fn record(&mut self, outcome: PageOutcome) -> Vec<FrontierEntry> {
        let PageOutcome { url, depth, result } = outcome;

        let findings = match result {
            Ok(findings) => findings,
            Err(e) => {
                self.record_failure(&url, depth, &e);
                return Vec::new();
            }
        };

        self.stats.pages_fetched += 1;

        let mut page_documents = findings.links.document_links.clone();
        self.all_links.extend(findings.links.anchor_links);
        self.document_links.extend(findings.links.document_links);

        if let Some(json) = findings.json {
            self.stats.json_decode_failures += json.decode_failures;
            page_documents.extend(json.documents.iter().cloned());
            self.document_links.extend(json.documents);
            self.all_links.extend(json.links.iter().cloned());
            self.json_links.extend(json.links);
        }

        if !page_documents.is_empty() {
            self.pages_with_documents
                .entry(url)
                .or_default()
                .extend(page_documents);
        }

        findings.children
    }

    fn record_failure(&mut self, url: &CanonicalUrl, depth: usize, error: &FetchError) {
        match error {
            // Expected for PDFs, images, dead links: not worth a warning
            FetchError::Status(_) | FetchError::NotHtml(_) => {
                debug!(%url, depth, error = %error, "page skipped")
            }
            _ => warn!(%url, depth, error = %error, "failed to fetch page"),
        }
        *self
            .stats
            .failures
            .entry(error.kind().to_string())
            .or_default() += 1;
    }

    pub fn record_wave(&mut self, stale: usize) {
        self.stats.waves += 1;
        self.stats.stale_entries_skipped += stale;
    }

    pub fn mark_cancelled(&mut self) {
        self.stats.cancelled = true;
    }

    // Freezes the crawl state into the final report
    //
    // Classification happens here, once, over the finished link sets.
    pub fn finish(self, pages_crawled: usize, taxonomy: &Taxonomy) -> CrawlReport {
        let classified_links = taxonomy.classify_all(&self.all_links);
        let classified_documents = taxonomy.classify_all(&self.document_links);

        CrawlReport {
            all_links: into_strings(self.all_links),
            document_links: into_strings(self.document_links),
            pages_with_documents: self
                .pages_with_documents
                .into_iter()
                .map(|(page, documents)| (page.into_string(), into_strings(documents)))
                .collect(),
            pages_crawled,
            json_links_count: self.json_links.len(),
            classified_links,
            classified_documents,
            stats: self.stats,
        }
    }
}

fn into_strings(urls: BTreeSet<CanonicalUrl>) -> Vec<String> {
    urls.into_iter().map(CanonicalUrl::into_string).collect()
}
