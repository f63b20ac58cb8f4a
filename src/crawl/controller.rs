// src/crawl/controller.rs
// =============================================================================
// Drives a crawl from the seed URL to the final report.
//
// How it works:
// 1. Validate the config and build one HTTP client for the whole crawl
// 2. Put the seed in the frontier at depth 0
// 3. Claim a wave of up to `max_concurrent` unvisited entries
// 4. Fetch them all concurrently and WAIT for the whole wave to finish
// 5. Fold each outcome into the aggregator, queue the unvisited children
// 6. Repeat until the frontier is empty (or the crawl is cancelled)
// 7. Classify the final link sets and return the report
//
// Waves vs. a free-running pool:
// - The next wave only starts when the slowest page of this one is done,
//   so one slow page costs some throughput
// - In exchange, claiming and queueing only ever happen here, between
//   waves, on one task. Pages are fetched in depth order (breadth-first)
//   and a URL is never fetched twice.
//
// Cancellation is checked between waves: the wave in flight finishes, and
// the report covers everything found up to that point.
// =============================================================================

use futures::future::join_all;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::classify::Taxonomy;
use crate::config::{CrawlConfig, CrawlSettings};
use crate::error::CrawlError;

use super::frontier::Frontier;
use super::report::{Aggregator, CrawlReport};
use super::worker::FetchWorker;

/// Progress snapshot, reported after every URL claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlProgress {
    /// URLs claimed so far (including the one just claimed)
    pub visited: usize,
    /// Entries still waiting in the frontier
    pub queued: usize,
}

/// Where a crawl is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Running,
    /// Cancelled: the frontier is no longer refilled
    Draining,
    Done,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrawlPhase::Idle => "idle",
            CrawlPhase::Running => "running",
            CrawlPhase::Draining => "draining",
            CrawlPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// A validated crawl, ready to run
///
/// Holds no state between runs: every call to `run` starts from the seed.
#[derive(Debug, Clone)]
pub struct Crawler {
    settings: Arc<CrawlSettings>,
    client: Client,
    cancel: CancellationToken,
}

impl Crawler {
    // Validates `config` and builds the HTTP client
    //
    // Fails on anything that makes the crawl impossible; no request has been
    // sent at that point.
    pub fn new(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let settings = config.prepare()?;

        // One client for the whole crawl (connection pooling)
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(CrawlError::HttpClient)?;

        Ok(Self {
            settings: Arc::new(settings),
            client,
            cancel: CancellationToken::new(),
        })
    }

    /// Stop the crawl at the next wave boundary once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    // Runs the crawl to completion
    //
    // Parameters:
    //   taxonomy: rules used to classify the final link sets
    //   progress: called after every URL claim; keep it cheap, the crawl
    //             waits for it
    //
    // Returns: the full report, or a CrawlError if a worker task died
    pub async fn run<F>(&self, taxonomy: &Taxonomy, mut progress: F) -> Result<CrawlReport, CrawlError>
    where
        F: FnMut(CrawlProgress),
    {
        let settings = &self.settings;
        let mut phase = CrawlPhase::Idle;
        let mut frontier = Frontier::new(settings.seed.clone(), settings.max_depth);
        let mut aggregator = Aggregator::new();
        let worker = FetchWorker::new(self.client.clone(), Arc::clone(settings));
        let semaphore = Arc::new(Semaphore::new(settings.max_concurrent));

        info!(
            seed = %settings.seed,
            max_depth = settings.max_depth,
            max_concurrent = settings.max_concurrent,
            "starting crawl"
        );
        transition(&mut phase, CrawlPhase::Running);

        while !frontier.is_empty() {
            if self.cancel.is_cancelled() {
                transition(&mut phase, CrawlPhase::Draining);
                aggregator.mark_cancelled();
                break;
            }

            let wave = frontier.claim_wave(settings.max_concurrent, |visited, queued| {
                progress(CrawlProgress { visited, queued })
            });
            aggregator.record_wave(wave.stale);

            if wave.entries.is_empty() {
                continue;
            }
            debug!(size = wave.entries.len(), queued = frontier.len(), "dispatching wave");

            let handles = wave.entries.into_iter().map(|entry| {
                let worker = worker.clone();
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    // The semaphore is never closed, so acquire can't fail
                    let _permit = semaphore.acquire_owned().await.ok();
                    worker.fetch(entry).await
                })
            });

            // Barrier: the whole wave finishes before anything is queued
            for joined in join_all(handles).await {
                let outcome = joined?;
                for child in aggregator.record(outcome) {
                    frontier.push(child);
                }
            }
        }

        let pages_crawled = frontier.visited().len();
        transition(&mut phase, CrawlPhase::Done);

        let report = aggregator.finish(pages_crawled, taxonomy);
        info!(
            pages_crawled = report.pages_crawled,
            links = report.all_links.len(),
            documents = report.document_links.len(),
            json_links = report.json_links_count,
            failed = report.stats.failed_pages(),
            cancelled = report.stats.cancelled,
            "crawl finished"
        );
        Ok(report)
    }
}

fn transition(phase: &mut CrawlPhase, next: CrawlPhase) {
    debug!(from = %phase, to = %next, "crawl phase");
    *phase = next;
}

// Validates `config`, crawls, and returns the report
//
// The one-call entry point: no state survives between calls.
pub async fn run_crawl<F>(config: &CrawlConfig, taxonomy: &Taxonomy, progress: F) -> Result<CrawlReport, CrawlError>
where
    F: FnMut(CrawlProgress),
{
    Crawler::new(config)?.run(taxonomy, progress).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::OUT_OF_SCOPE_LABEL;
    use std::time::Duration;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
    }

    async fn page(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_crawl_finds_documents_and_skips_social() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            r#"<a href="/news/release-1">Release</a>
               <a href="https://facebook.com/x">Facebook</a>
               <a href="/report.pdf">Report</a>"#,
        )
        .await;
        page(&server, "/news/release-1", "<h1>Release</h1>").await;

        let config = CrawlConfig::new(server.uri()).with_max_depth(2);
        let report = run_crawl(&config, &Taxonomy::default(), |_| {}).await.unwrap();

        let release = format!("{}/news/release-1", server.uri());
        let pdf = format!("{}/report.pdf", server.uri());

        assert!(report.pages_crawled >= 1);
        assert!(report.document_links.contains(&pdf));
        assert!(report.all_links.contains(&release));
        assert!(!report.all_links.iter().any(|l| l.contains("facebook.com")));
        assert!(report
            .classified_links
            .contains("Press Releases", &release));
        assert!(report
            .document_links
            .iter()
            .all(|d| report.all_links.contains(d)));
        assert_eq!(report.pages_with_documents[&server.uri()], vec![pdf]);
    }

    #[tokio::test]
    async fn test_crawl_finds_links_in_inline_json() {
        let server = MockServer::start().await;
        page(
            &server,
            "/investors",
            r#"<html><body><h1>Investors</h1>
               <script type="application/json">{"link":"/ir/q3.pdf"}</script>
               </body></html>"#,
        )
        .await;

        let seed = format!("{}/investors", server.uri());
        let config = CrawlConfig::new(seed.clone()).with_max_depth(1);
        let report = run_crawl(&config, &Taxonomy::default(), |_| {}).await.unwrap();

        let q3 = format!("{}/ir/q3.pdf", server.uri());
        assert!(report.document_links.contains(&q3));
        assert!(report.json_links_count >= 1);
        assert_eq!(report.pages_with_documents[&seed], vec![q3.clone()]);
        assert!(report.classified_documents.contains("Quarterly Results", &q3));
    }

    #[tokio::test]
    async fn test_json_links_are_never_crawled() {
        let server = MockServer::start().await;
        page(
            &server,
            "/investors",
            r#"<a href="/ir/calendar">Calendar</a>
               <script type="application/json">{"faq":"/ir/faq"}</script>"#,
        )
        .await;
        page(&server, "/ir/calendar", "<p>Dates</p>").await;
        Mock::given(method("GET"))
            .and(path("/ir/faq"))
            .respond_with(html("<p>never</p>"))
            .expect(0)
            .mount(&server)
            .await;

        let seed = format!("{}/investors", server.uri());
        let config = CrawlConfig::new(seed).with_max_depth(3);
        let report = run_crawl(&config, &Taxonomy::default(), |_| {}).await.unwrap();

        assert!(report.all_links.contains(&format!("{}/ir/faq", server.uri())));
        assert_eq!(report.pages_crawled, 2);
        assert_eq!(report.json_links_count, 1);
    }

    #[tokio::test]
    async fn test_failed_pages_do_not_stop_the_crawl() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            r#"<a href="/broken">Broken</a>
               <a href="/slow">Slow</a>
               <a href="/ok">Ok</a>"#,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(
                ResponseTemplate::new(500).set_body_raw(r#"<a href="/from-broken">x</a>"#, "text/html"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(html(r#"<a href="/from-slow">x</a>"#).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;
        page(&server, "/ok", r#"<a href="/deeper">Deeper</a>"#).await;
        page(&server, "/deeper", "<p>The end</p>").await;

        let config = CrawlConfig::new(server.uri())
            .with_max_depth(3)
            .with_max_concurrent(4)
            .with_request_timeout(Duration::from_millis(300));
        let report = run_crawl(&config, &Taxonomy::default(), |_| {}).await.unwrap();

        assert_eq!(report.pages_crawled, 5);
        assert_eq!(report.stats.pages_fetched, 3);
        assert_eq!(report.stats.failures["http_status"], 1);
        assert_eq!(report.stats.failures["timeout"], 1);
        assert!(report.all_links.contains(&format!("{}/deeper", server.uri())));
        assert!(!report.all_links.iter().any(|l| l.contains("/from-")));
    }

    #[tokio::test]
    async fn test_each_url_is_fetched_once() {
        let server = MockServer::start().await;
        let hub = r#"<a href="/a">A</a><a href="/b/">B</a><a href="/c">C</a><a href="/shared">S</a>"#;
        let leaf = r#"<a href="/">Home</a><a href="/shared#top">S</a><a href="/a">A</a><a href="/B">B?</a>"#;

        for (route, body) in [("/", hub), ("/a", leaf), ("/b", leaf), ("/c", leaf), ("/shared", leaf), ("/B", leaf)] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(html(body))
                .expect(1)
                .mount(&server)
                .await;
        }

        let config = CrawlConfig::new(server.uri())
            .with_max_depth(4)
            .with_max_concurrent(3);
        let mut claims = Vec::new();
        let report = run_crawl(&config, &Taxonomy::default(), |p| claims.push(p.visited))
            .await
            .unwrap();

        assert_eq!(report.pages_crawled, 6);
        assert_eq!(claims, (1..=6).collect::<Vec<_>>());
        assert!(report.stats.waves >= 3);
        // MockServer verifies the expect(1)s when it's dropped
    }

    #[tokio::test]
    async fn test_depth_one_fetches_only_the_seed() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/next">Next</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/next"))
            .respond_with(html("<p>never</p>"))
            .expect(0)
            .mount(&server)
            .await;

        let config = CrawlConfig::new(server.uri()).with_max_depth(1);
        let report = run_crawl(&config, &Taxonomy::default(), |_| {}).await.unwrap();
        assert_eq!(report.pages_crawled, 1);
        assert_eq!(report.all_links, vec![format!("{}/next", server.uri())]);
    }

    #[tokio::test]
    async fn test_cancellation_stops_at_wave_boundary() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/next">Next</a>"#).await;
        Mock::given(method("GET"))
            .and(path("/next"))
            .respond_with(html("<p>never</p>"))
            .expect(0)
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        let crawler = Crawler::new(&CrawlConfig::new(server.uri()).with_max_depth(3))
            .unwrap()
            .with_cancellation(token.clone());

        // Cancel as soon as the seed is claimed: its wave still completes
        let report = crawler
            .run(&Taxonomy::default(), |_| token.cancel())
            .await
            .unwrap();

        assert!(report.stats.cancelled);
        assert_eq!(report.pages_crawled, 1);
        assert_eq!(report.stats.pages_fetched, 1);
        assert_eq!(report.all_links, vec![format!("{}/next", server.uri())]);
    }

    #[tokio::test]
    async fn test_bad_config_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(html(""))
            .expect(0)
            .mount(&server)
            .await;

        let config = CrawlConfig::new(server.uri()).with_document_pattern("([unclosed");
        let result = run_crawl(&config, &Taxonomy::default(), |_| {}).await;
        assert!(matches!(result, Err(CrawlError::InvalidPattern { .. })));

        let result = run_crawl(&CrawlConfig::new("http://"), &Taxonomy::default(), |_| {}).await;
        assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
    }

    #[tokio::test]
    async fn test_out_of_scope_links_are_reported_separately() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            r#"<a href="/careers/dividend-analyst">Jobs</a><a href="/dividends">Dividends</a>"#,
        )
        .await;

        let config = CrawlConfig::new(server.uri()).with_max_depth(1);
        let report = run_crawl(&config, &Taxonomy::default(), |_| {}).await.unwrap();

        let careers = format!("{}/careers/dividend-analyst", server.uri());
        let dividends = format!("{}/dividends", server.uri());
        assert!(report.classified_links.contains(OUT_OF_SCOPE_LABEL, &careers));
        assert!(report.classified_links.contains("Dividends", &dividends));
    }
}
