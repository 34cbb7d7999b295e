//! URL canonicalization
//!
//! Every URL handled by the engine is carried in its canonical form: two
//! syntactically different URLs that normalize identically are the same
//! entity for deduplication, storage keys, and hook invocations.

mod normalize;

pub use normalize::normalize_str;

use crate::UrlResult;
use std::fmt;
use url::Url;

/// A URL in canonical form
///
/// The canonical form is the identity key used by the history ledger and the
/// frontier: host lowercased, `www.` stripped, fragment removed, path
/// dot-segments resolved, query parameters sorted. Construct with
/// [`CanonicalUrl::parse`] for absolute URLs or [`CanonicalUrl::resolve`] for
/// link targets relative to a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl {
    inner: Url,
}

impl CanonicalUrl {
    /// Parses and canonicalizes an absolute URL string
    pub fn parse(raw: &str) -> UrlResult<Self> {
        normalize::normalize_str(raw).map(|inner| Self { inner })
    }

    /// Resolves an href against a base page and canonicalizes the result
    ///
    /// Relative references, absolute paths, and absolute URLs are all
    /// accepted; blank hrefs and targets that canonicalize to nothing usable
    /// (unsupported scheme, no host) are errors the caller is expected to
    /// drop.
    pub fn resolve(href: &str, base: &CanonicalUrl) -> UrlResult<Self> {
        let href = href.trim();
        if href.is_empty() {
            return Err(crate::UrlError::Malformed("blank href".to_string()));
        }
        let joined = base
            .inner
            .join(href)
            .map_err(|e| crate::UrlError::Parse(e.to_string()))?;
        normalize::normalize(joined).map(|inner| Self { inner })
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    /// The underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.inner
    }

    /// The `scheme://host[:port]` prefix, used as the robots.txt cache key
    pub fn authority(&self) -> String {
        match self.inner.port() {
            Some(port) => format!(
                "{}://{}:{}",
                self.inner.scheme(),
                self.inner.host_str().unwrap_or_default(),
                port
            ),
            None => format!(
                "{}://{}",
                self.inner.scheme(),
                self.inner.host_str().unwrap_or_default()
            ),
        }
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_forms_are_equal() {
        let a = CanonicalUrl::parse("https://WWW.Example.com/a/../b#frag").unwrap();
        let b = CanonicalUrl::parse("https://example.com/b").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = CanonicalUrl::parse("https://example.com/dir/page").unwrap();
        let child = CanonicalUrl::resolve("sibling", &base).unwrap();
        assert_eq!(child.as_str(), "https://example.com/dir/sibling");
    }

    #[test]
    fn test_resolve_absolute_path() {
        let base = CanonicalUrl::parse("https://example.com/dir/page").unwrap();
        let child = CanonicalUrl::resolve("/other", &base).unwrap();
        assert_eq!(child.as_str(), "https://example.com/other");
    }

    #[test]
    fn test_resolve_absolute_url() {
        let base = CanonicalUrl::parse("https://example.com/").unwrap();
        let child = CanonicalUrl::resolve("https://other.com/page", &base).unwrap();
        assert_eq!(child.as_str(), "https://other.com/page");
    }

    #[test]
    fn test_resolve_blank_href_is_error() {
        let base = CanonicalUrl::parse("https://example.com/").unwrap();
        assert!(CanonicalUrl::resolve("   ", &base).is_err());
    }

    #[test]
    fn test_resolve_mailto_is_error() {
        let base = CanonicalUrl::parse("https://example.com/").unwrap();
        assert!(CanonicalUrl::resolve("mailto:test@example.com", &base).is_err());
    }

    #[test]
    fn test_authority_without_port() {
        let url = CanonicalUrl::parse("https://example.com/page").unwrap();
        assert_eq!(url.authority(), "https://example.com");
    }

    #[test]
    fn test_authority_with_port() {
        let url = CanonicalUrl::parse("http://127.0.0.1:8080/page").unwrap();
        assert_eq!(url.authority(), "http://127.0.0.1:8080");
    }
}
