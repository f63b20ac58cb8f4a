// src/crawl/worker.rs
// =============================================================================
// The fetch worker: fetches ONE page and reports what it found.
//
// Steps for a page:
// 1. GET the URL (with timeout and User-Agent set on the client)
// 2. Anything but "200 + text/html" means: nothing to see here
// 3. Extract anchor links, flag the document links
// 4. Pick out same-site links that are still shallow enough to crawl next
// 5. On investor/press pages, also dig links out of JSON payloads
//
// The worker never touches the crawl's shared sets. It returns a PageOutcome
// and the controller folds it in, one outcome at a time. That way there is
// nothing to lock.
//
// Every failure for this URL (network, timeout, status, content type) ends
// up as a FetchError inside the outcome. Nothing here can stop the crawl.
// =============================================================================

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use scraper::Html;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::config::CrawlSettings;
use crate::error::FetchError;
use crate::links::{
    extract_json_links, extract_json_text_links, is_investor_or_media_page,
    json_blocks_from_document, links_from_document, CanonicalUrl, JsonLinks, PageLinks,
};

use super::frontier::FrontierEntry;

/// What a successfully fetched page contained
#[derive(Debug, Clone, Default)]
pub struct PageFindings {
    pub links: PageLinks,
    /// Present only for investor/media pages
    pub json: Option<JsonLinks>,
    /// Same-site links to crawl at depth + 1
    pub children: Vec<FrontierEntry>,
}

/// The result of working on one frontier entry
#[derive(Debug)]
pub struct PageOutcome {
    pub url: CanonicalUrl,
    pub depth: usize,
    pub result: Result<PageFindings, FetchError>,
}

/// Fetches pages for one crawl
///
/// Cheap to clone: the client and settings are both reference-counted.
#[derive(Debug, Clone)]
pub struct FetchWorker {
    client: Client,
    settings: Arc<CrawlSettings>,
}

impl FetchWorker {
    pub fn new(client: Client, settings: Arc<CrawlSettings>) -> Self {
        Self { client, settings }
    }

    // Fetches one claimed entry
    //
    // The entry must already be in the visited set.
    pub async fn fetch(&self, entry: FrontierEntry) -> PageOutcome {
        debug!(url = %entry.url, depth = entry.depth, "fetching page");
        let result = self.fetch_page(&entry.url, entry.depth).await;
        PageOutcome {
            url: entry.url,
            depth: entry.depth,
            result,
        }
    }

    async fn fetch_page(&self, url: &CanonicalUrl, depth: usize) -> Result<PageFindings, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(FetchError::from_request)?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let content_type = content_type(&response);
        if !content_type.contains("text/html") {
            return Err(FetchError::NotHtml(content_type));
        }

        // Relative links resolve against where we ended up after redirects
        let base = response.url().clone();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e)
            }
        })?;

        let investor_page = is_investor_or_media_page(url.as_str());

        // Html isn't Send, so it must be gone before the next .await
        let (links, inline_json) = {
            let document = Html::parse_document(&body);
            let links = links_from_document(&document, &base, &self.settings.document_pattern);
            let inline_json = if investor_page && !self.settings.refetch_json {
                Some(self.inline_json_links(&document, &base))
            } else {
                None
            };
            (links, inline_json)
        };

        let json = match (investor_page, inline_json) {
            (_, Some(found)) => Some(found),
            (true, None) => Some(self.refetched_json_links(url).await),
            (false, None) => None,
        };

        let children = self.same_site_children(&links, depth);

        debug!(
            url = %url,
            links = links.anchor_links.len(),
            documents = links.document_links.len(),
            json_links = json.as_ref().map_or(0, |j| j.links.len()),
            children = children.len(),
            "page extracted"
        );

        Ok(PageFindings {
            links,
            json,
            children,
        })
    }

    // Links to follow next: same host, and depth + 1 still under the limit
    fn same_site_children(&self, links: &PageLinks, depth: usize) -> Vec<FrontierEntry> {
        let next_depth = depth + 1;
        if next_depth >= self.settings.max_depth {
            return Vec::new();
        }

        links
            .anchor_links
            .iter()
            .filter(|link| {
                link.to_url()
                    .map(|parsed| self.settings.site.contains(&parsed))
                    .unwrap_or(false)
            })
            .map(|link| FrontierEntry::new(link.clone(), next_depth))
            .collect()
    }

    // Walks the <script type="application/json"> blocks of a parsed page
    fn inline_json_links(&self, document: &Html, base: &Url) -> JsonLinks {
        let mut found = JsonLinks::default();
        for block in json_blocks_from_document(document) {
            found.merge(extract_json_text_links(base, &block, &self.settings.document_pattern));
        }
        found
    }

    // Requests the page a second time, asking for JSON
    //
    // A JSON answer is walked as a whole; an HTML answer has its inline JSON
    // blocks walked. Failures here only mean "no JSON links".
    async fn refetched_json_links(&self, url: &CanonicalUrl) -> JsonLinks {
        let response = match self
            .client
            .get(url.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => response,
            Ok(response) => {
                debug!(%url, status = response.status().as_u16(), "JSON refetch rejected");
                return JsonLinks::default();
            }
            Err(e) => {
                debug!(%url, error = %e, "JSON refetch failed");
                return JsonLinks::default();
            }
        };

        let base = response.url().clone();
        let is_json = content_type(&response).contains("application/json");
        let pattern = &self.settings.document_pattern;

        if is_json {
            match response.json::<Value>().await {
                Ok(payload) => extract_json_links(&base, &payload, pattern),
                Err(e) => {
                    debug!(%url, error = %e, "skipping malformed JSON response");
                    JsonLinks {
                        decode_failures: 1,
                        ..JsonLinks::default()
                    }
                }
            }
        } else {
            match response.text().await {
                Ok(html) => {
                    let document = Html::parse_document(&html);
                    self.inline_json_links(&document, &base)
                }
                Err(e) => {
                    debug!(%url, error = %e, "JSON refetch body unreadable");
                    JsonLinks::default()
                }
            }
        }
    }
}

// Lower-cased Content-Type header, or "" if missing
fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the HTML parsed inside its own { ... } block?
//    - scraper's Html uses non-thread-safe reference counting, so it isn't Send
//    - The controller runs each worker with tokio::spawn, which needs a Send
//      future
//    - A future is only Send if nothing non-Send is alive across an .await,
//      so the document is dropped at the end of the block, before any .await
//
// 2. Why return Result inside PageOutcome instead of Result<PageOutcome>?
//    - A failed page is a normal event in a crawl, not an error of the crawl
//    - The controller always gets an outcome back and decides what to count
// -----------------------------------------------------------------------------
