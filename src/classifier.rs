//! Embeddability classification.
//!
//! A single header-only probe decides whether a link target can be rendered
//! inside a frame. Inability to confirm safety is treated as unsafe: any
//! probe failure classifies as blocked, not embeddable. There are no
//! retries; a transient failure is indistinguishable from a real block.

use crate::fetcher;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const X_FRAME_OPTIONS: &str = "x-frame-options";
const CONTENT_SECURITY_POLICY: &str = "content-security-policy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Embeddable,
    Blocked,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub classification: Classification,
    /// The header or failure that produced the verdict.
    pub reason: String,
}

impl ClassificationResult {
    /// `Unknown` routes exactly like `Blocked`: when in doubt, synthesize.
    pub fn is_embeddable(&self) -> bool {
        self.classification == Classification::Embeddable
    }
}

/// Probe a URL and classify it, with the default probe timeout.
pub async fn classify(url: &Url) -> ClassificationResult {
    classify_with_timeout(url, PROBE_TIMEOUT).await
}

/// Probe a URL and classify it. The timeout is injectable for tests.
#[instrument(skip_all, fields(url = %url))]
pub async fn classify_with_timeout(url: &Url, timeout: Duration) -> ClassificationResult {
    match fetcher::probe(url, timeout).await {
        Ok(probe) => {
            let result = decide(&probe.headers);
            info!(classification = ?result.classification, reason = %result.reason, "probe complete");
            result
        }
        Err(e) if e.is_attributable() => {
            warn!(error = %e, "probe failed, treating as blocked");
            ClassificationResult {
                classification: Classification::Blocked,
                reason: e.to_string(),
            }
        }
        Err(e) => {
            warn!(error = %e, "probe failed for an unattributable reason");
            ClassificationResult {
                classification: Classification::Unknown,
                reason: e.to_string(),
            }
        }
    }
}

/// Apply the header decision table. First match wins.
pub fn decide(headers: &HeaderMap) -> ClassificationResult {
    let x_frame_options = headers
        .get(X_FRAME_OPTIONS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();
    if x_frame_options == "deny" || x_frame_options == "sameorigin" {
        return ClassificationResult {
            classification: Classification::Blocked,
            reason: format!("X-Frame-Options: {x_frame_options}"),
        };
    }

    // Substring heuristic, not a CSP grammar parse. The original policy is
    // deliberately lenient and its misses are part of the contract.
    let csp = headers
        .get(CONTENT_SECURITY_POLICY)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if csp.contains("frame-ancestors")
        && (csp.contains("frame-ancestors 'none'") || csp.contains("frame-ancestors 'src'"))
    {
        return ClassificationResult {
            classification: Classification::Blocked,
            reason: "Content-Security-Policy: frame-ancestors".to_string(),
        };
    }

    ClassificationResult {
        classification: Classification::Embeddable,
        reason: "no blocking headers".to_string(),
    }
}
