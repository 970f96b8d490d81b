//! Outgoing request model seen by the interceptor.

use bytes::Bytes;
use reqwest::{Method, header};
use url::Url;

/// A request issued by a page.
#[derive(Debug, Clone)]
pub struct CacheRequest {
    pub method: Method,
    pub url: Url,
    pub headers: header::HeaderMap,
    pub body: Option<Bytes>,
}

impl CacheRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: header::HeaderMap::new(), body: None }
    }

    /// Shorthand for a bodiless GET.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a header; invalid names or values are dropped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) =
            (header::HeaderName::from_bytes(name.as_bytes()), header::HeaderValue::from_str(value))
        {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// Whether the request asks for an HTML document (a page navigation).
    pub fn accepts_html(&self) -> bool {
        self.headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("text/html"))
    }
}
