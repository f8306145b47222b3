//! Same-domain link discovery from markup payloads.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::frontier::normalize_url;

/// Extract every hyperlink from a markup payload, resolved absolute against
/// `base`, keeping only links whose host matches `seed_host` exactly (no
/// subdomain expansion). Duplicates within one page are collapsed; order is
/// not significant.
pub fn discover_links(bytes: &[u8], base: &Url, seed_host: &str) -> Vec<Url> {
    let html = String::from_utf8_lossy(bytes);
    let doc = Html::parse_document(&html);
    let link_sel = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&link_sel) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        // Skip in-page anchors and non-navigational schemes.
        if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:")
        {
            continue;
        }

        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        resolved.set_fragment(None);

        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        if resolved.host_str() != Some(seed_host) {
            continue;
        }

        if seen.insert(normalize_url(&resolved)) {
            links.push(resolved);
        }
    }

    links
}
