//! Robots.txt compliance gate
//!
//! Fetches `/robots.txt` once per authority, caches the rules for a day, and
//! answers allow/deny queries against them.

use crate::robots::cache::CachedRobots;
use crate::robots::PolitenessGate;
use crate::url::CanonicalUrl;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Production politeness gate backed by live robots.txt files
pub struct RobotsSentry {
    client: Client,
    user_agent: String,
    cache: RwLock<HashMap<String, CachedRobots>>,
}

impl RobotsSentry {
    /// Creates a sentry sharing the crawl's HTTP client
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached rules for an authority, fetching on miss or when
    /// the cached copy has gone stale
    async fn rules_for(&self, authority: &str) -> CachedRobots {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(authority) {
                if !cached.is_stale() {
                    return cached.clone();
                }
            }
        }

        let fetched = self.fetch_robots(authority).await;

        let mut cache = self.cache.write().await;
        cache.insert(authority.to_string(), fetched.clone());
        fetched
    }

    async fn fetch_robots(&self, authority: &str) -> CachedRobots {
        let robots_url = format!("{}/robots.txt", authority);
        tracing::debug!("fetching robots rules from {}", robots_url);

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => CachedRobots::from_body(body),
                Err(e) => {
                    tracing::debug!("failed to read robots.txt body from {}: {}", robots_url, e);
                    CachedRobots::unavailable()
                }
            },
            Ok(response) => {
                tracing::debug!(
                    "robots.txt at {} returned status {}",
                    robots_url,
                    response.status()
                );
                CachedRobots::unavailable()
            }
            Err(e) => {
                tracing::debug!("failed to fetch robots.txt from {}: {}", robots_url, e);
                CachedRobots::unavailable()
            }
        }
    }
}

#[async_trait]
impl PolitenessGate for RobotsSentry {
    async fn is_safe_to_visit(&self, url: &CanonicalUrl) -> bool {
        let rules = self.rules_for(&url.authority()).await;
        rules.is_allowed(url.as_str(), &self.user_agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn sentry_for(server: &MockServer) -> (RobotsSentry, CanonicalUrl) {
        let client = Client::new();
        let sentry = RobotsSentry::new(client, "testbot");
        let url = CanonicalUrl::parse(&format!("{}/page", server.uri())).unwrap();
        (sentry, url)
    }

    #[tokio::test]
    async fn test_disallowed_path_is_unsafe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /page"),
            )
            .mount(&server)
            .await;

        let (sentry, url) = sentry_for(&server).await;
        assert!(!sentry.is_safe_to_visit(&url).await);
    }

    #[tokio::test]
    async fn test_allowed_path_is_safe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"),
            )
            .mount(&server)
            .await;

        let (sentry, url) = sentry_for(&server).await;
        assert!(sentry.is_safe_to_visit(&url).await);
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (sentry, url) = sentry_for(&server).await;
        assert!(sentry.is_safe_to_visit(&url).await);
    }

    #[tokio::test]
    async fn test_robots_fetched_once_per_authority() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
            .expect(1)
            .mount(&server)
            .await;

        let (sentry, url) = sentry_for(&server).await;
        assert!(sentry.is_safe_to_visit(&url).await);
        assert!(sentry.is_safe_to_visit(&url).await);
        assert!(sentry.is_safe_to_visit(&url).await);
    }
}
