//! HTTP fetching
//!
//! The orchestrator talks to servers through the [`FetchProvider`] trait:
//! `get_url` performs a full GET (body downloaded, links extracted) and
//! `check_url` a HEAD (status only). [`HttpFetcher`] is the production
//! implementation over a shared `reqwest` client.

mod document;

pub use document::Document;

use crate::url::CanonicalUrl;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Response with a body; links extracted when the content was HTML
    Document(Document),

    /// Status-only response (HEAD semantics)
    Status(u16),

    /// Transport failure or unreadable response
    Error(String),
}

/// Performs GETs and HEADs on behalf of the orchestrator
///
/// Implementations must tolerate abrupt cancellation mid-request: a forced
/// shutdown may abort the task that is awaiting a response.
#[async_trait]
pub trait FetchProvider: Send + Sync {
    /// Fetches the full content of a URL (GET)
    async fn get_url(&self, url: &CanonicalUrl) -> FetchResult;

    /// Fetches only the status of a URL (HEAD)
    async fn check_url(&self, url: &CanonicalUrl) -> FetchResult;
}

/// Builds the HTTP client shared by the fetcher and the robots sentry
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetch provider over a `reqwest` client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchProvider for HttpFetcher {
    async fn get_url(&self, url: &CanonicalUrl) -> FetchResult {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return FetchResult::Error(classify_error(&e)),
        };

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchResult::Error(format!("failed to read response body: {}", e)),
        };

        let is_html = content_type
            .as_deref()
            .map(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
            // No Content-Type header: assume HTML, the parser tolerates anything
            .unwrap_or(true);

        if is_html {
            FetchResult::Document(Document::from_html(status_code, content_type, body))
        } else {
            FetchResult::Document(Document::without_links(status_code, content_type, body))
        }
    }

    async fn check_url(&self, url: &CanonicalUrl) -> FetchResult {
        match self.client.head(url.as_str()).send().await {
            Ok(response) => FetchResult::Status(response.status().as_u16()),
            Err(e) => FetchResult::Error(classify_error(&e)),
        }
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
