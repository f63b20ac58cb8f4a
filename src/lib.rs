// src/lib.rs
// =============================================================================
// linkscout: crawl a website, collect its links and documents, and sort
// every link into a keyword taxonomy.
//
// Modules:
// - links: URL normalization, link filters, HTML/JSON link extraction
// - crawl: the frontier, fetch workers, wave controller and report
// - classify: the ordered keyword taxonomy and the classifier
// - config: crawl settings and their validation
// - error: error types
//
// The library never prints or writes files. It hands back a CrawlReport and
// reports progress through a callback; showing results is up to the caller
// (see src/main.rs for the CLI).
//
// Example:
//   let config = CrawlConfig::new("example.com").with_max_depth(2);
//   let report = run_crawl(&config, &Taxonomy::default(), |_| {}).await?;
// =============================================================================

pub mod classify;
pub mod config;
pub mod crawl;
pub mod error;
pub mod links;

pub use classify::{
    CategoryRule, Classification, ClassifiedReport, Taxonomy, OUT_OF_SCOPE_LABEL,
    UNCLASSIFIED_LABEL,
};
pub use config::CrawlConfig;
pub use crawl::{run_crawl, CrawlProgress, CrawlReport, CrawlStats, Crawler};
pub use error::{CrawlError, FetchError, TaxonomyError};
pub use links::{normalize, CanonicalUrl};
