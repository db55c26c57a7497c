//! Exclusion policy for discovered links.
//!
//! Two independent checks, either of which drops a link: a case-insensitive
//! keyword substring match on the link text, and an exact match of the
//! normalized hostname against a domain blocklist. The lists are data; the
//! algorithm never changes when they do.

use crate::links::LinkRecord;
use std::collections::HashSet;
use tracing::debug;

/// Link texts containing any of these (case-insensitively) are site chrome,
/// not stories.
const EXCLUDED_KEYWORDS: &[&str] = &[
    "archives",
    "advertise",
    "privacy policy",
    "contact",
    "rss",
    "visits to drudge",
];

/// Hosts that never lead to article content. Stored pre-normalized
/// (no leading `www.`).
const EXCLUDED_DOMAINS: &[&str] = &[
    "twitter.com",
    "x.com",
    "facebook.com",
    "instagram.com",
    "youtube.com",
    "drudgereportarchives.com",
    "intermarkets.net",
    "quantcast.com",
];

#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    keywords: Vec<String>,
    domains: HashSet<String>,
}

impl ExclusionPolicy {
    /// Build a policy from arbitrary lists. Keywords are lowercased and
    /// domains normalized on the way in so the checks stay trivial.
    pub fn new<K, D>(keywords: K, domains: D) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            domains: domains
                .into_iter()
                .map(|d| normalize_host(&d.as_ref().to_lowercase()).to_string())
                .collect(),
        }
    }

    /// The built-in blocklists.
    pub fn builtin() -> Self {
        Self::new(EXCLUDED_KEYWORDS, EXCLUDED_DOMAINS)
    }

    /// Whether a link should be dropped from the pipeline.
    ///
    /// A URL without an extractable host (mailto:, data:, ...) fails open:
    /// the policy cannot judge what it cannot parse, and silently eating
    /// links would be worse than passing the odd one through.
    pub fn should_exclude(&self, link: &LinkRecord) -> bool {
        let text = link.text.to_lowercase();
        if self.keywords.iter().any(|k| text.contains(k.as_str())) {
            return true;
        }

        match link.href.host_str() {
            Some(host) => {
                let host = host.to_lowercase();
                self.domains.contains(normalize_host(&host))
            }
            None => {
                debug!(href = %link.href, "no host to check against domain blocklist, keeping link");
                false
            }
        }
    }
}

/// Strip exactly one leading `www.` label.
fn normalize_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
