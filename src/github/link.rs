// src/github/link.rs
// =============================================================================
// This module parses the `Link` header GitHub uses for pagination.
//
// A paginated response carries a header like:
//   <https://api.github.com/...&page=2>; rel="next", <...&page=5>; rel="last"
//
// We turn it into a map from relation name ("next", "last", ...) to URL.
// Only "next" matters to the fetcher, but keeping the whole map makes the
// trace log useful when paging goes wrong.
// =============================================================================

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

// Compiled once, reused for every response
fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // A constant pattern that is known to compile
        Regex::new(r#"<(.*?)>;\s*rel="(.*?)""#).expect("link pattern is valid")
    })
}

/// Parses a `Link` header into a relation → URL map.
///
/// Malformed entries are skipped rather than rejected.
pub fn parse_link_header(header: &str) -> HashMap<String, String> {
    link_pattern()
        .captures_iter(header)
        .map(|caps| (caps[2].to_string(), caps[1].to_string()))
        .collect()
}

/// Returns the URL of the next page, if the header names one.
pub fn next_page_url(header: &str) -> Option<String> {
    parse_link_header(header).remove("next")
}
