// src/ingest/url_parse.rs
use log::debug;
use percent_encoding::percent_decode_str;
use url::Url as StdUrl;

use crate::models::crawl::UrlComponents;

/// Splits a crawled address into path and last path segment.
///
/// Path and slug are percent-decoded, so `/caf%C3%A9` reads `/café` and
/// compares equal to a crawl that exported the unescaped form. Addresses
/// without a scheme are retried with `https://`. An address that
/// still does not parse keeps its raw `url` and gets an empty path and slug,
/// so it only takes part in the content signals.
pub fn decompose_url(address: &str) -> UrlComponents {
    match parse_address(address) {
        Some(parsed) => {
            let path = decode_component(parsed.path());
            UrlComponents {
                url: address.to_string(),
                last_segment: last_path_segment(&parsed),
                path,
            }
        }
        None => {
            debug!("Could not parse address '{}', leaving path empty", address);
            UrlComponents {
                url: address.to_string(),
                ..Default::default()
            }
        }
    }
}

/// True when `decompose_url` can recover a path from the address.
pub fn is_parseable(address: &str) -> bool {
    parse_address(address).is_some()
}

fn parse_address(address: &str) -> Option<StdUrl> {
    let trimmed = address.trim();
    if trimmed.is_empty()
        || trimmed.starts_with("mailto:")
        || trimmed.starts_with("tel:")
    {
        return None;
    }

    let with_scheme = if !trimmed.contains("://") {
        format!("https://{}", trimmed)
    } else {
        trimmed.to_string()
    };

    StdUrl::parse(&with_scheme)
        .ok()
        .filter(|parsed| parsed.host_str().is_some())
}

fn last_path_segment(parsed: &StdUrl) -> String {
    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(decode_component)
        .unwrap_or_default()
}

fn decode_component(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_product_url() {
        let parts = decompose_url("https://old.example.com/products/blue-widget");
        assert_eq!(parts.url, "https://old.example.com/products/blue-widget");
        assert_eq!(parts.path, "/products/blue-widget");
        assert_eq!(parts.last_segment, "blue-widget");
    }

    #[test]
    fn test_trailing_slash_and_query_are_ignored_for_slug() {
        let parts = decompose_url("https://new.example.com/shop/blue-widget-v2/?ref=nav#top");
        assert_eq!(parts.path, "/shop/blue-widget-v2/");
        assert_eq!(parts.last_segment, "blue-widget-v2");
    }

    #[test]
    fn test_path_and_slug_are_percent_decoded() {
        let escaped = decompose_url("https://example.com/menu/caf%C3%A9");
        assert_eq!(escaped.path, "/menu/café");
        assert_eq!(escaped.last_segment, "café");
        assert_eq!(escaped.url, "https://example.com/menu/caf%C3%A9");

        let raw = decompose_url("https://example.com/menu/café");
        assert_eq!(raw.path, escaped.path);
        assert_eq!(raw.last_segment, escaped.last_segment);

        let spaced = decompose_url("https://example.com/blue%20widget/");
        assert_eq!(spaced.last_segment, "blue widget");
    }

    #[test]
    fn test_root_has_no_slug() {
        let parts = decompose_url("https://new.example.com");
        assert_eq!(parts.path, "/");
        assert_eq!(parts.last_segment, "");
    }

    #[test]
    fn test_missing_scheme_is_retried() {
        let parts = decompose_url("www.example.com/about-us");
        assert_eq!(parts.path, "/about-us");
        assert_eq!(parts.last_segment, "about-us");
        assert_eq!(parts.url, "www.example.com/about-us");
    }

    #[test]
    fn test_unparseable_address_keeps_url_only() {
        let parts = decompose_url("mailto:info@example.com");
        assert_eq!(parts.url, "mailto:info@example.com");
        assert!(parts.path.is_empty());
        assert!(parts.last_segment.is_empty());
        assert!(!is_parseable("mailto:info@example.com"));
        assert!(!is_parseable("   "));
    }
}
