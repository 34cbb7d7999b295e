//! Politeness gate
//!
//! Before a URL is fetched, the orchestrator asks the politeness gate whether
//! the URL is safe to visit under the site's robots policy. The gate is only
//! consulted when `respect_robots_txt` is enabled; a denial drops the entry
//! silently with no hook fired.

mod cache;
mod sentry;

pub use cache::CachedRobots;
pub use sentry::RobotsSentry;

use crate::url::CanonicalUrl;
use async_trait::async_trait;

/// Yes/no oracle for "is this URL safe to fetch now"
#[async_trait]
pub trait PolitenessGate: Send + Sync {
    /// Returns true if robots policy permits fetching this URL
    async fn is_safe_to_visit(&self, url: &CanonicalUrl) -> bool;
}

/// Gate that permits everything; useful for tests and embedders with their
/// own compliance layer
pub struct AllowAll;

#[async_trait]
impl PolitenessGate for AllowAll {
    async fn is_safe_to_visit(&self, _url: &CanonicalUrl) -> bool {
        true
    }
}
