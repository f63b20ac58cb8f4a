// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a seed URL, in waves
// - Same-site restriction (other hosts are recorded, never crawled)
// - Configurable depth limit and wave size
// - Each URL is fetched at most once
// - Links hidden in JSON on investor/press pages are picked up too
//
// Submodules:
// - frontier: the queue of pages to fetch + the visited set
// - worker: fetches and parses one page
// - report: collects worker results and builds the final report
// - controller: runs the waves, start to finish
// =============================================================================

mod controller;
mod frontier;
mod report;
mod worker;

// Re-export the main crawling API
pub use controller::{run_crawl, CrawlPhase, CrawlProgress, Crawler};
pub use frontier::{Frontier, FrontierEntry, VisitedSet, Wave};
pub use report::{Aggregator, CrawlReport, CrawlStats};
pub use worker::{FetchWorker, PageFindings, PageOutcome};
