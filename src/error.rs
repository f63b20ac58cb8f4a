// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// There are three kinds of failure, and they are handled very differently:
//
// 1. FetchError - one URL couldn't be fetched (timeout, 500, not HTML...)
//    The crawl carries on; the failure only shows up in the diagnostics.
// 2. CrawlError - the crawl can't start (bad seed URL, bad regex) or broke
//    down internally. The caller gets this instead of a report.
// 3. TaxonomyError - a taxonomy file is unreadable or invalid.
//
// We use `thiserror` so each variant gets a Display message and a source()
// chain for free. The binary wraps all of these in anyhow.
// =============================================================================

use thiserror::Error;

/// Reasons the crawl as a whole could not produce a report
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid seed URL '{url}': {source}")]
    InvalidSeed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("seed URL has no host: {0}")]
    SeedWithoutHost(String),

    #[error("seed URL must use http or https: {0}")]
    UnsupportedScheme(String),

    #[error("invalid document pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("crawl worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Why a single URL yielded nothing
///
/// These never abort a crawl; the controller only counts them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("not an HTML page: {0}")]
    NotHtml(String),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl FetchError {
    // Sorts a reqwest error into the variant that describes it best
    pub fn from_request(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_connect() {
            FetchError::Connect(error)
        } else {
            FetchError::Request(error)
        }
    }

    /// Short, stable name used as a diagnostic counter key
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::Connect(_) => "connect",
            FetchError::Request(_) => "request",
            FetchError::Status(_) => "http_status",
            FetchError::NotHtml(_) => "not_html",
            FetchError::Body(_) => "body",
        }
    }
}

/// Problems loading or validating a taxonomy
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid taxonomy JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("taxonomy rule has an empty label")]
    EmptyLabel,

    #[error("taxonomy label '{0}' is reserved")]
    ReservedLabel(String),

    #[error("taxonomy entry '{0}' has an empty keyword")]
    EmptyKeyword(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kinds() {
        assert_eq!(FetchError::Timeout.kind(), "timeout");
        assert_eq!(FetchError::Status(500).kind(), "http_status");
        assert_eq!(FetchError::NotHtml("application/pdf".into()).kind(), "not_html");
    }

    #[test]
    fn test_messages() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP 404");
        assert_eq!(
            CrawlError::ZeroLimit("max_depth").to_string(),
            "max_depth must be at least 1"
        );
        assert_eq!(
            TaxonomyError::ReservedLabel("out of scope".into()).to_string(),
            "taxonomy label 'out of scope' is reserved"
        );
    }
}
