// src/config.rs
// =============================================================================
// Settings for one crawl, and the checks we run on them before crawling.
//
// CrawlConfig is what the user hands us (from the CLI or from code).
// CrawlConfig::prepare() turns it into a CrawlSettings, which is what the
// crawler actually runs with: the seed is parsed and normalized, the
// document pattern is compiled, limits are checked.
//
// Anything that would make the crawl impossible (unparseable seed, broken
// regex, depth 0...) fails here, before a single request goes out.
// =============================================================================

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::CrawlError;
use crate::links::{is_http_scheme, normalize, with_default_scheme, CanonicalUrl};

/// Matches PDF links in the most common URL shapes
pub const DEFAULT_DOCUMENT_PATTERN: &str = r"\.pdf$|/pdf/|download.*pdf|\.PDF$";

/// Desktop browser User-Agent; some IR sites block obvious bots
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_MAX_CONCURRENT: usize = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User-supplied crawl settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Starting URL; "https://" is added if it has no http(s) scheme
    pub seed: String,
    /// Pages at depth < max_depth are fetched (1 = only the seed)
    pub max_depth: usize,
    /// Size of one wave of concurrent fetches
    pub max_concurrent: usize,
    /// Case-insensitive regex that marks document links
    pub document_pattern: String,
    pub user_agent: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Re-request investor/media pages as JSON instead of only reading the
    /// JSON blocks already inside their HTML
    pub refetch_json: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            document_pattern: DEFAULT_DOCUMENT_PATTERN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refetch_json: false,
        }
    }
}

impl CrawlConfig {
    pub fn new<S: Into<String>>(seed: S) -> Self {
        Self {
            seed: seed.into(),
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_document_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.document_pattern = pattern.into();
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_refetch_json(mut self, refetch: bool) -> Self {
        self.refetch_json = refetch;
        self
    }

    // Validates everything and builds the settings the crawler runs with
    pub fn prepare(&self) -> Result<CrawlSettings, CrawlError> {
        if self.max_depth == 0 {
            return Err(CrawlError::ZeroLimit("max_depth"));
        }
        if self.max_concurrent == 0 {
            return Err(CrawlError::ZeroLimit("max_concurrent"));
        }

        let document_pattern = RegexBuilder::new(&self.document_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| CrawlError::InvalidPattern {
                pattern: self.document_pattern.clone(),
                source,
            })?;

        let raw_seed = with_default_scheme(&self.seed);
        let seed = normalize(&raw_seed).map_err(|source| CrawlError::InvalidSeed {
            url: self.seed.clone(),
            source,
        })?;
        let seed_url = seed.to_url().map_err(|source| CrawlError::InvalidSeed {
            url: self.seed.clone(),
            source,
        })?;
        if !is_http_scheme(&seed_url) {
            return Err(CrawlError::UnsupportedScheme(self.seed.clone()));
        }
        let site = SiteAuthority::of(&seed_url)
            .ok_or_else(|| CrawlError::SeedWithoutHost(self.seed.clone()))?;

        Ok(CrawlSettings {
            seed,
            site,
            max_depth: self.max_depth,
            max_concurrent: self.max_concurrent,
            document_pattern,
            user_agent: self.user_agent.clone(),
            request_timeout: self.request_timeout,
            refetch_json: self.refetch_json,
        })
    }
}

/// Host + port of the site being crawled
///
/// Only links with the same authority as the seed are followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteAuthority {
    host: String,
    port: Option<u16>,
}

impl SiteAuthority {
    pub fn of(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_ascii_lowercase();
        Some(Self {
            host,
            // Explicit ports only, so http:// and https:// links to the same
            // host count as the same site
            port: url.port(),
        })
    }

    pub fn contains(&self, url: &Url) -> bool {
        Self::of(url).as_ref() == Some(self)
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Validated, ready-to-run crawl settings
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub seed: CanonicalUrl,
    pub site: SiteAuthority,
    pub max_depth: usize,
    pub max_concurrent: usize,
    pub document_pattern: Regex,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub refetch_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::new("example.com");
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.max_concurrent, 30);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.refetch_json);
    }

    #[test]
    fn test_prepare_defaults_scheme_and_normalizes() {
        let settings = CrawlConfig::new("Example.com/").prepare().unwrap();
        assert_eq!(settings.seed.as_str(), "https://example.com");
        assert_eq!(settings.site.host(), "example.com");
    }

    #[test]
    fn test_document_pattern_is_case_insensitive() {
        let settings = CrawlConfig::new("example.com")
            .with_document_pattern(r"\.pdf$")
            .prepare()
            .unwrap();
        assert!(settings.document_pattern.is_match("https://example.com/A.PDF"));
    }

    #[test]
    fn test_prepare_rejects_bad_input() {
        assert!(matches!(
            CrawlConfig::new("example.com").with_document_pattern("(").prepare(),
            Err(CrawlError::InvalidPattern { .. })
        ));
        assert!(matches!(
            CrawlConfig::new("example.com").with_max_depth(0).prepare(),
            Err(CrawlError::ZeroLimit("max_depth"))
        ));
        assert!(matches!(
            CrawlConfig::new("example.com").with_max_concurrent(0).prepare(),
            Err(CrawlError::ZeroLimit("max_concurrent"))
        ));
        assert!(matches!(
            CrawlConfig::new("http://").prepare(),
            Err(CrawlError::InvalidSeed { .. })
        ));
        assert!(matches!(
            CrawlConfig::new("").prepare(),
            Err(CrawlError::InvalidSeed { .. })
        ));
        assert!(matches!(
            CrawlConfig::new("ftp://example.com/files").prepare(),
            Err(CrawlError::UnsupportedScheme(seed)) if seed == "ftp://example.com/files"
        ));
    }

    #[test]
    fn test_site_authority() {
        let site = SiteAuthority::of(&Url::parse("https://Example.com").unwrap()).unwrap();
        assert!(site.contains(&Url::parse("https://example.com:443/a").unwrap()));
        assert!(site.contains(&Url::parse("http://example.com/a").unwrap()));
        assert!(!site.contains(&Url::parse("https://example.com:8443/a").unwrap()));
        assert!(!site.contains(&Url::parse("https://blog.example.com/a").unwrap()));
    }
}
