use chrono::{DateTime, Utc};
use reqwest::{StatusCode, header::HeaderMap};
use url::Url;

/// A fully downloaded HTML page.
#[derive(Debug)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

/// Metadata from a header-only HEAD probe. No body is ever downloaded.
#[derive(Debug)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}
