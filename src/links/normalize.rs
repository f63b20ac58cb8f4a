// src/links/normalize.rs
// =============================================================================
// This module turns a URL into its canonical "identity" form.
//
// Two URLs that only differ by:
// - a trailing slash          (https://example.com/a/  vs  https://example.com/a)
// - the case of the host      (https://Example.COM/a   vs  https://example.com/a)
// - a fragment                (https://example.com/a#x vs  https://example.com/a)
// are the same page as far as the crawler is concerned, so they must map to
// the same CanonicalUrl. Everything else (scheme, path, params, query) is kept.
//
// Rust concepts:
// - Newtype pattern: CanonicalUrl wraps a String so it can't be mixed up
//   with a raw, un-normalized URL string
// - Trait impls (Display, AsRef, Borrow) so it still works like a string
// =============================================================================

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use url::Url;

/// A URL in its normalized identity form.
///
/// The only way to build one is through [`normalize`], so holding a
/// `CanonicalUrl` means the string already went through normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parses the canonical string back into a `Url`
    ///
    /// This can't fail for values built by `normalize`, but we still return
    /// a Result instead of panicking.
    pub fn to_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.0)
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets a HashSet<CanonicalUrl> be queried with a plain &str
impl Borrow<str> for CanonicalUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Normalizes a raw URL string
//
// Parameters:
//   raw: an absolute URL (relative URLs must be resolved by the caller first)
//
// Returns: the CanonicalUrl, or the parse error if `raw` isn't a valid URL
//
// Examples:
//   "https://Example.com/a/"     -> "https://example.com/a"
//   "https://example.com/"       -> "https://example.com"
//   "https://example.com/a?b=1#c" -> "https://example.com/a?b=1"
pub fn normalize(raw: &str) -> Result<CanonicalUrl, url::ParseError> {
    let parsed = Url::parse(raw.trim())?;
    Ok(canonicalize(&parsed))
}

// Same as normalize() but for a Url that was already parsed
// (e.g. the result of base.join(href))
pub fn canonicalize(url: &Url) -> CanonicalUrl {
    // URLs without an authority (mailto:, data:, ...) have no host or
    // hierarchical path to clean up, only the fragment goes
    let host = match url.host_str() {
        Some(host) if !url.cannot_be_a_base() => host,
        _ => {
            let mut stripped = url.clone();
            stripped.set_fragment(None);
            return CanonicalUrl(stripped.to_string());
        }
    };

    let mut out = String::with_capacity(url.as_str().len());
    out.push_str(url.scheme());
    out.push_str("://");

    if !url.username().is_empty() {
        out.push_str(url.username());
        if let Some(password) = url.password() {
            out.push(':');
            out.push_str(password);
        }
        out.push('@');
    }

    out.push_str(&host.to_ascii_lowercase());

    // The url crate already drops default ports (80 for http, 443 for https)
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }

    // Every trailing slash goes, so normalize(normalize(u)) == normalize(u)
    // holds even for paths like "/a//"
    out.push_str(url.path().trim_end_matches('/'));

    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }

    CanonicalUrl(out)
}

// Prepends https:// when the user typed a bare domain like "example.com"
//
// Anything with an explicit "scheme://" is left alone, so "ftp://host" stays
// an ftp URL and the caller can reject its scheme.
pub fn with_default_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
