//! Anchor discovery and normalization for the source page.
//!
//! Raw anchors come straight out of the parsed document and are normalized
//! into [`LinkRecord`]s immediately: fragment-only hrefs are navigation
//! chrome and never produce a record, relative hrefs are resolved against the
//! page's final URL, and duplicate targets collapse to their first
//! occurrence. Headlines are harvested separately with their own selectors
//! and are never filtered.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// An anchor as scraped, before normalization.
#[derive(Debug, Clone)]
pub struct RawAnchor {
    pub href: Option<String>,
    pub text: String,
}

/// The canonical unit flowing through the pipeline. `href` is always an
/// absolute URL with a scheme and host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub text: String,
    pub href: Url,
}

/// A headline element found on the source page. The matched element's own
/// href attribute is often absent (the selector may land on a `<b>` inside
/// the anchor), so it stays optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub text: String,
    pub href: Option<String>,
}

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Headline-bearing patterns on the aggregator page, in priority order.
static HEADLINE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["a > b", r#"font[size="+2"] a"#, r#"font[size="+1"] a"#, "a b"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collect every anchor on the page as a [`RawAnchor`].
pub fn collect_anchors(document: &Html) -> Vec<RawAnchor> {
    document
        .select(&ANCHOR_SELECTOR)
        .map(|element| RawAnchor {
            href: element.value().attr("href").map(str::to_string),
            text: element_text(element),
        })
        .collect()
}

/// Turn a raw anchor into a [`LinkRecord`], or `None` when it is not a
/// navigable link (no href, fragment-only, or unresolvable against the base).
pub fn normalize_anchor(anchor: &RawAnchor, base: &Url) -> Option<LinkRecord> {
    let href = anchor.href.as_deref()?;
    if href.starts_with('#') {
        return None;
    }
    match base.join(href) {
        Ok(absolute) => Some(LinkRecord {
            text: anchor.text.clone(),
            href: absolute,
        }),
        Err(e) => {
            debug!(href, error = %e, "dropping unresolvable href");
            None
        }
    }
}

/// Normalize all anchors on the page, deduplicating by absolute href
/// (first occurrence wins).
pub fn collect_links(document: &Html, base: &Url) -> Vec<LinkRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    collect_anchors(document)
        .iter()
        .filter_map(|anchor| normalize_anchor(anchor, base))
        .filter(|link| seen.insert(link.href.as_str().to_string()))
        .collect()
}

/// Harvest headlines using the ordered selector list, deduplicated by text.
pub fn collect_headlines(document: &Html) -> Vec<Headline> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headlines = Vec::new();
    for selector in HEADLINE_SELECTORS.iter() {
        for element in document.select(selector) {
            let text = element_text(element);
            if text.is_empty() || !seen.insert(text.clone()) {
                continue;
            }
            headlines.push(Headline {
                text,
                href: element.value().attr("href").map(str::to_string),
            });
        }
    }
    headlines
}
