//! Hook surface for embedding applications
//!
//! A crawl is driven by a [`CrawlHandler`]: the engine decides *when* to act
//! on a URL, the handler decides *whether* and *what for*. Only
//! `should_visit` and `visit` are required; every other hook defaults to a
//! no-op (or `false` for `should_check`), so embedders override only what
//! they need.
//!
//! Handlers are shared by reference across all worker tasks, so any mutable
//! state they carry needs interior mutability (`Mutex`, atomics, channels).
//! A panicking hook is isolated to its own task; it never takes down the
//! crawl.

use crate::fetch::Document;
use crate::url::CanonicalUrl;

/// Callbacks invoked by the crawl orchestrator at defined points
pub trait CrawlHandler: Send + Sync + 'static {
    /// Decides whether a URL should be visited (full GET, links followed)
    fn should_visit(&self, url: &CanonicalUrl) -> bool;

    /// Decides whether a URL should be checked (HEAD, status only)
    ///
    /// Independent of `should_visit`: both branches may run for one URL.
    /// Checked pages yield no links, so checking suits content that has none.
    fn should_check(&self, _url: &CanonicalUrl) -> bool {
        false
    }

    /// Called with every visited page, after its links have been dispatched
    fn visit(&self, url: &CanonicalUrl, doc: &Document);

    /// Called with the status code of every checked URL
    fn check(&self, _url: &CanonicalUrl, _status_code: u16) {}

    /// Reserved for reacting to non-success status codes
    ///
    /// Not currently invoked by the orchestrator; status codes arrive at
    /// `visit`/`check` via the document instead. Inspect them there until
    /// this hook's contract is settled.
    fn on_unexpected_status_code(&self, _url: &CanonicalUrl, _status_code: u16) {}

    /// Called when fetching a URL fails; the URL is not retried
    fn on_content_fetch_error(&self, _url: &CanonicalUrl, _reason: &str) {}

    /// Called when a URL scheduled for crawling was already seen
    fn on_repeat_visit(&self, _url: &CanonicalUrl, _parent: &CanonicalUrl) {}

    /// Called once before any worker takes action
    fn on_crawl_start(&self) {}

    /// Called once after the crawl has wound down (blocking start only)
    fn on_crawl_end(&self) {}
}
