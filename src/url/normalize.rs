use crate::UrlError;
use url::Url;

/// Normalizes an already-parsed URL into its canonical form
///
/// # Normalization Steps
///
/// 1. Reject schemes other than http/https
/// 2. Lowercase the host and remove a leading `www.`
/// 3. Normalize the path:
///    - Remove dot segments (`.` and `..`)
///    - Collapse repeated slashes
///    - Remove the trailing slash (except for the root `/`)
///    - An empty path becomes `/`
/// 4. Remove the fragment (everything after `#`)
/// 5. Sort query parameters alphabetically and drop an empty query string
///
/// Default ports are already dropped by the `url` crate during parsing.
pub fn normalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {
            let mut normalized_host = host.to_lowercase();
            if let Some(stripped) = normalized_host.strip_prefix("www.") {
                normalized_host = stripped.to_string();
            }
            url.set_host(Some(&normalized_host))
                .map_err(|e| UrlError::Malformed(format!("failed to set host: {}", e)))?;
        }
        _ => return Err(UrlError::MissingHost),
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = sorted_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            let query_string = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query_string));
        }
    }

    Ok(url)
}

/// Parses a raw string and normalizes it
pub fn normalize_str(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Malformed("blank URL".to_string()));
    }
    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize(url)
}

/// Normalizes a URL path by removing dot segments, collapsing repeated
/// slashes, and trimming the trailing slash
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Collects query parameters sorted by key
fn sorted_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_host() {
        let result = normalize_str("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_remove_www() {
        let result = normalize_str("https://www.example.com/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_remove_trailing_slash() {
        let result = normalize_str("https://example.com/page/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_keep_root_slash() {
        let result = normalize_str("https://example.com/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_str("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_sort_query_params() {
        let result = normalize_str("https://example.com/page?b=2&a=1").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?a=1&b=2");
    }

    #[test]
    fn test_normalize_path_with_dots() {
        let result = normalize_str("https://example.com/a/../b/./c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_multiple_slashes() {
        let result = normalize_str("https://example.com///path//to///page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/path/to/page");
    }

    #[test]
    fn test_parent_directory_at_root() {
        let result = normalize_str("https://example.com/../page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = normalize_str("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_default_port_dropped() {
        let result = normalize_str("http://example.com:80/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_explicit_port_kept() {
        let result = normalize_str("http://example.com:8080/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com:8080/page");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_str("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_blank_url() {
        let result = normalize_str("   ");
        assert!(matches!(result.unwrap_err(), UrlError::Malformed(_)));
    }

    #[test]
    fn test_malformed_url() {
        let result = normalize_str("not a url");
        assert!(result.is_err());
    }

    #[test]
    fn test_http_kept_as_http() {
        // Mock servers in tests speak plain HTTP, so the scheme is preserved
        let result = normalize_str("http://example.com/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }
}
