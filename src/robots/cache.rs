//! Cached robots.txt state for one authority

use chrono::{DateTime, Duration, Utc};
use robotstxt::DefaultMatcher;

/// Robots rules fetched for a single `scheme://host[:port]` authority
///
/// `body` is `None` when robots.txt could not be retrieved (network failure
/// or non-success status); in that case every URL is allowed, matching the
/// usual crawler convention.
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// Raw robots.txt content, if the fetch succeeded
    body: Option<String>,

    /// When the robots.txt was fetched
    fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Wraps a successfully fetched robots.txt body
    pub fn from_body(body: String) -> Self {
        Self {
            body: Some(body),
            fetched_at: Utc::now(),
        }
    }

    /// Records an unfetchable robots.txt; everything is allowed
    pub fn unavailable() -> Self {
        Self {
            body: None,
            fetched_at: Utc::now(),
        }
    }

    /// Checks whether the cache entry is older than 24 hours
    ///
    /// Robots files are conventionally refreshed daily to pick up changes
    /// made by the site owner.
    pub fn is_stale(&self) -> bool {
        Utc::now() - self.fetched_at > Duration::hours(24)
    }

    /// Checks if a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.body {
            Some(body) if !body.is_empty() => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, user_agent, url)
            }
            _ => true,
        }
    }

    #[cfg(test)]
    pub fn backdate(&mut self, hours: i64) {
        self.fetched_at = Utc::now() - Duration::hours(hours);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_allows_everything() {
        let robots = CachedRobots::unavailable();
        assert!(robots.is_allowed("https://example.com/any/path", "testbot"));
        assert!(robots.is_allowed("https://example.com/admin", "testbot"));
    }

    #[test]
    fn test_empty_body_allows_everything() {
        let robots = CachedRobots::from_body(String::new());
        assert!(robots.is_allowed("https://example.com/any/path", "testbot"));
    }

    #[test]
    fn test_disallow_all() {
        let robots = CachedRobots::from_body("User-agent: *\nDisallow: /".to_string());
        assert!(!robots.is_allowed("https://example.com/", "testbot"));
        assert!(!robots.is_allowed("https://example.com/page", "testbot"));
    }

    #[test]
    fn test_disallow_specific_prefix() {
        let robots = CachedRobots::from_body("User-agent: *\nDisallow: /admin".to_string());
        assert!(robots.is_allowed("https://example.com/page", "testbot"));
        assert!(!robots.is_allowed("https://example.com/admin", "testbot"));
        assert!(!robots.is_allowed("https://example.com/admin/users", "testbot"));
    }

    #[test]
    fn test_specific_user_agent_rules() {
        let robots = CachedRobots::from_body(
            "User-agent: badbot\nDisallow: /\n\nUser-agent: *\nAllow: /".to_string(),
        );
        assert!(robots.is_allowed("https://example.com/page", "goodbot"));
        assert!(!robots.is_allowed("https://example.com/page", "badbot"));
    }

    #[test]
    fn test_fresh_cache_not_stale() {
        let robots = CachedRobots::unavailable();
        assert!(!robots.is_stale());
    }

    #[test]
    fn test_old_cache_is_stale() {
        let mut robots = CachedRobots::unavailable();
        robots.backdate(25);
        assert!(robots.is_stale());
    }

    #[test]
    fn test_cache_not_stale_at_23_hours() {
        let mut robots = CachedRobots::unavailable();
        robots.backdate(23);
        assert!(!robots.is_stale());
    }
}
