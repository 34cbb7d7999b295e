//! Fetched page representation and link extraction
//!
//! A [`Document`] is the parsed result of a GET: the response status, the raw
//! body, and the outgoing link targets pulled out of the HTML. Hrefs are kept
//! exactly as written in the markup; resolution against the page URL happens
//! in the orchestrator so that filtering rules live in one place.

use scraper::{Html, Selector};

/// A fetched page handed to the `visit` hook
#[derive(Debug, Clone)]
pub struct Document {
    /// HTTP status code of the response
    pub status_code: u16,

    /// Content-Type header value, if present
    pub content_type: Option<String>,

    /// Raw response body
    pub body: String,

    /// Raw href values of `<a>` tags, in document order
    pub anchor_hrefs: Vec<String>,

    /// Raw targets of other outgoing resource references
    /// (`img[src]`, `script[src]`, `link[href]`)
    pub resource_links: Vec<String>,
}

impl Document {
    /// Builds a document from an HTML response body, extracting links
    pub fn from_html(status_code: u16, content_type: Option<String>, body: String) -> Self {
        let html = Html::parse_document(&body);
        let anchor_hrefs = extract_anchor_hrefs(&html);
        let resource_links = extract_resource_links(&html);
        drop(html);

        Self {
            status_code,
            content_type,
            body,
            anchor_hrefs,
            resource_links,
        }
    }

    /// Builds a document for a non-HTML response; no links to extract
    pub fn without_links(status_code: u16, content_type: Option<String>, body: String) -> Self {
        Self {
            status_code,
            content_type,
            body,
            anchor_hrefs: Vec::new(),
            resource_links: Vec::new(),
        }
    }
}

fn extract_anchor_hrefs(html: &Html) -> Vec<String> {
    let mut hrefs = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in html.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                if !href.is_empty() {
                    hrefs.push(href.to_string());
                }
            }
        }
    }

    hrefs
}

fn extract_resource_links(html: &Html) -> Vec<String> {
    let mut links = Vec::new();

    for (selector_str, attr) in [("img[src]", "src"), ("script[src]", "src"), ("link[href]", "href")]
    {
        if let Ok(selector) = Selector::parse(selector_str) {
            for element in html.select(&selector) {
                if let Some(target) = element.value().attr(attr) {
                    let target = target.trim();
                    if !target.is_empty() {
                        links.push(target.to_string());
                    }
                }
            }
        }
    }

    links
}
