use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

/// Body text of the synthesized response for documents that cannot be served.
const OFFLINE_BODY: &str = "Offline";

/// An outgoing request as seen by the cache controller.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Build a request from an absolute URL string.
    pub fn parse(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid request URL: {}", url))?;
        Ok(Self::new(method, url))
    }

    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    /// Ask for an HTML document, the way a browser navigation does.
    pub fn navigation(url: Url) -> Self {
        Self::get(url).with_header(
            header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// True when the `Accept` header asks for `text/html`.
    pub fn accepts_html(&self) -> bool {
        self.headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("text/html"))
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Cache identity: method plus the URL without its fragment.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        format!("{} {}", self.method, url)
    }

    /// Cache identity with the query string and fragment removed.
    pub fn search_insensitive_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        format!("{} {}", self.method, url)
    }
}

/// A captured response. Bodies are held in memory; the controller only ever
/// deals with shell documents, assets and small JSON payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Synthesized 503 for a document with neither network nor cache.
    pub fn offline() -> Self {
        Self::new(503, OFFLINE_BODY).with_header("content-type", "text/plain; charset=utf-8")
    }

    /// Synthesized empty 504 for an asset or request with neither network nor cache.
    pub fn gateway_timeout() -> Self {
        Self::new(504, Vec::new())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> Request {
        Request::parse(Method::GET, url).expect("valid test URL")
    }

    #[test]
    fn test_accepts_html() {
        let url = Url::parse("https://hit.example/").expect("valid test URL");
        assert!(Request::navigation(url.clone()).accepts_html());
        assert!(!Request::get(url.clone()).accepts_html());
        assert!(!Request::get(url)
            .with_header(header::ACCEPT, "application/json")
            .accepts_html());
    }

    #[test]
    fn test_cache_keys() {
        let req = request("https://hit.example/index.html?v=2#top");
        assert_eq!(req.cache_key(), "GET https://hit.example/index.html?v=2");
        assert_eq!(
            req.search_insensitive_key(),
            "GET https://hit.example/index.html"
        );
        assert_eq!(req.path(), "/index.html");
    }

    #[test]
    fn test_fragment_is_not_part_of_cache_key() {
        assert_eq!(
            request("https://hit.example/index.html#top").cache_key(),
            request("https://hit.example/index.html").cache_key()
        );
        assert_ne!(
            request("https://hit.example/index.html?v=1").cache_key(),
            request("https://hit.example/index.html").cache_key()
        );
    }

    #[test]
    fn test_parse_rejects_relative_url() {
        assert!(Request::parse(Method::GET, "/index.html").is_err());
    }

    #[test]
    fn test_synthetic_responses() {
        let offline = Response::offline();
        assert_eq!(offline.status, 503);
        assert_eq!(offline.text(), "Offline");
        assert_eq!(offline.header("Content-Type"), Some("text/plain; charset=utf-8"));

        let timeout = Response::gateway_timeout();
        assert_eq!(timeout.status, 504);
        assert!(timeout.body.is_empty());
        assert!(!timeout.is_success());
    }
}
