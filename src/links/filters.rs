// src/links/filters.rs
// =============================================================================
// Small yes/no checks the crawler runs on every link it finds.
//
// - is_excluded_protocol: href points at something we can't fetch
//   (javascript:, mailto:, tel:, ...). Checked on the raw href, before we
//   spend time resolving it.
// - is_social_media: link goes to a social network, we never record those
// - is_excluded_asset: link is an image/stylesheet/script/archive, not content
// - is_investor_or_media_page: page is likely to hide document links inside
//   JSON payloads, so the JSON extraction pass runs for it
//
// All checks are case-insensitive and have no side effects.
// =============================================================================

use url::Url;

/// Social platforms whose links are dropped from every result set
pub const SOCIAL_MEDIA_DOMAINS: &[&str] = &[
    "instagram.com",
    "facebook.com",
    "linkedin.com",
    "youtube.com",
    "twitter.com",
    "x.com",
    "tiktok.com",
    "snapchat.com",
    "pinterest.com",
    "reddit.com",
    "tumblr.com",
    "whatsapp.com",
    "telegram.org",
];

/// File extensions that are never documents or pages
pub const EXCLUDED_ASSET_EXTENSIONS: &[&str] = &[
    ".jpg", ".png", ".gif", ".css", ".js", ".xml", ".ico", ".svg", ".zip", ".exe",
];

/// Keywords that mark investor-relations and press pages
pub const INVESTOR_MEDIA_KEYWORDS: &[&str] = &[
    "investor",
    "press",
    "media",
    "news",
    "release",
    "announcement",
    "publication",
];

/// href prefixes that can't be fetched over HTTP
pub const EXCLUDED_PROTOCOLS: &[&str] = &[
    "javascript:",
    "mailto:",
    "tel:",
    "sms:",
    "fax:",
    "data:",
    "#",
];

// Returns true if the URL's host mentions a social platform
//
// A leading "www." is stripped, then the host only has to contain one of
// the platform domains, so m.facebook.com and mytwitter.com both count.
pub fn is_social_media(url: &str) -> bool {
    let host = match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_ascii_lowercase(),
            None => return false,
        },
        Err(_) => return false,
    };
    let domain = host.strip_prefix("www.").unwrap_or(&host);

    SOCIAL_MEDIA_DOMAINS
        .iter()
        .any(|social| domain.contains(social))
}

// Returns true if the URL contains a non-document file extension anywhere
pub fn is_excluded_asset(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    EXCLUDED_ASSET_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

// Returns true if the URL looks like an investor-relations or press page
pub fn is_investor_or_media_page(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    INVESTOR_MEDIA_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

// Returns true if a raw href uses a scheme we never follow
pub fn is_excluded_protocol(href: &str) -> bool {
    let lower = href.trim().to_ascii_lowercase();
    EXCLUDED_PROTOCOLS
        .iter()
        .any(|proto| lower.starts_with(proto))
}

// Only http and https links are recorded or crawled
pub fn is_http_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
