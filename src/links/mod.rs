// src/links/mod.rs
// =============================================================================
// Everything about individual links: what identity a URL has, which links
// we skip, and how links are pulled out of HTML and JSON.
//
// Submodules:
// - normalize: URL -> CanonicalUrl (the dedup key)
// - filters: social media / asset / protocol / investor-page checks
// - html: anchor links and inline JSON blocks from an HTML page
// - json: links hidden inside JSON payloads
//
// None of this does any I/O. The crawl module feeds it fetched bodies.
// =============================================================================

mod filters;
mod html;
mod json;
mod normalize;

pub use filters::{
    is_excluded_asset, is_excluded_protocol, is_http_scheme, is_investor_or_media_page,
    is_social_media, EXCLUDED_ASSET_EXTENSIONS, EXCLUDED_PROTOCOLS, INVESTOR_MEDIA_KEYWORDS,
    SOCIAL_MEDIA_DOMAINS,
};
pub use html::{
    extract_page_links, json_blocks_from_document, json_script_blocks, links_from_document,
    PageLinks,
};
pub use json::{
    extract_json_links, extract_json_text_links, walk_strings, JsonLinks, MAX_JSON_DEPTH,
};
pub use normalize::{canonicalize, normalize, with_default_scheme, CanonicalUrl};
