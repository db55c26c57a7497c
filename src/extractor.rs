//! Main-content extraction for link targets.
//!
//! The page is fetched and an ordered list of structural selectors is tried
//! against it. The first selector that matches any element wins outright;
//! later, possibly more specific matches are never consulted. Within the
//! winning element, script/style/nav/footer/header/aside subtrees are
//! skipped and the remaining text nodes are joined with single spaces.
//!
//! Extraction is never fatal: any fetch or parse problem yields empty
//! content and the pipeline moves on.

use crate::fetcher::{self, FetchError};
use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector, node::Node};
use std::time::Duration;
use tracing::{error, instrument};
use url::Url;

pub const CONTENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Candidate containers for article text, in priority order. `body` is the
/// last resort and can be noisy.
const CONTENT_SELECTOR_LIST: &[&str] = &[
    "article",
    "main",
    ".main-content",
    "#main-content",
    ".article-body",
    r#"div[role="main"]"#,
    "div.story-content",
    "div.entry-content",
    "div.post-content",
    "div.content-body",
    "body",
];

/// Tags whose subtrees carry no article text.
const STRIPPED_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTENT_SELECTOR_LIST
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

/// Extracted article text. Empty means "no usable content found"; there is
/// no error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
}

impl ExtractedContent {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Fetch a page and extract its main text.
#[instrument(skip_all, fields(url = %url))]
pub async fn extract(url: &Url) -> ExtractedContent {
    match fetcher::fetch(url, CONTENT_TIMEOUT).await {
        Ok(page) => extract_from_html(&page.body),
        Err(e @ FetchError::Http(_)) => {
            error!(error = %e, "http error fetching content");
            ExtractedContent::empty()
        }
        Err(e) => {
            error!(error = %e, "failed to fetch content");
            ExtractedContent::empty()
        }
    }
}

/// Apply the selector heuristics to an already-fetched document.
pub fn extract_from_html(html: &str) -> ExtractedContent {
    let document = Html::parse_document(html);
    for selector in CONTENT_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            return ExtractedContent {
                text: visible_text(element),
            };
        }
    }
    ExtractedContent::empty()
}

/// Concatenate the element's text nodes, skipping stripped subtrees, with
/// single-space separators and no surrounding whitespace.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    collect_text(*element, &mut parts);
    parts.join(" ")
}

fn collect_text<'a>(node: NodeRef<'a, Node>, parts: &mut Vec<&'a str>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => parts.extend(text.split_whitespace()),
            Node::Element(el) => {
                if !STRIPPED_TAGS.contains(&el.name()) {
                    collect_text(child, parts);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_text_is_extracted_and_joined() {
        let content = extract_from_html(
            "<html><body><article><h1>Title</h1><p>First para.</p><p>Second para.</p></article></body></html>",
        );
        assert_eq!(content.text, "Title First para. Second para.");
    }

    #[test]
    fn first_matching_selector_wins() {
        // Both `article` and `div.entry-content` match; `article` is listed
        // first, so the entry-content div is never consulted.
        let content = extract_from_html(
            r#"<html><body>
                <article>From the article.</article>
                <div class="entry-content">From the entry content.</div>
            </body></html>"#,
        );
        assert_eq!(content.text, "From the article.");
    }

    #[test]
    fn unwanted_subtrees_are_stripped_within_the_match() {
        let content = extract_from_html(
            r#"<html><body><article>
                <nav>Menu items</nav>
                <p>Story text.</p>
                <script>var x = 1;</script>
                <aside>Related reading</aside>
                <footer>Copyright</footer>
            </article></body></html>"#,
        );
        assert_eq!(content.text, "Story text.");
    }

    #[test]
    fn body_is_the_last_resort() {
        let content = extract_from_html(
            "<html><body><div><p>Plain page text.</p></div></body></html>",
        );
        assert_eq!(content.text, "Plain page text.");
    }

    #[test]
    fn empty_document_yields_empty_content() {
        let content = extract_from_html("");
        assert!(content.is_empty());
    }

    #[test]
    fn whitespace_only_document_yields_empty_content() {
        let content = extract_from_html("<html><body>   \n\t  </body></html>");
        assert!(content.is_empty());
    }

    #[test]
    fn nested_stripped_tags_do_not_leak_text() {
        let content = extract_from_html(
            r#"<html><body><article><div><header>Site header</header><p>Kept.</p></div></article></body></html>"#,
        );
        assert_eq!(content.text, "Kept.");
    }
}
