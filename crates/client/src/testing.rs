//! Scripted in-memory network for worker tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use precache_core::Error;
use reqwest::{StatusCode, header};
use url::Url;

use crate::fetch::{CacheRequest, FetchResponse, Network, classify_response};

enum Route {
    Respond { status: u16, body: &'static str, headers: header::HeaderMap, delay: Option<Duration> },
    Fail,
}

/// Network stub with per-URL call counters. Unknown URLs fail like a
/// dropped connection.
pub(crate) struct StubNetwork {
    origin: Url,
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubNetwork {
    pub(crate) fn new(origin: &str) -> Self {
        Self {
            origin: Url::parse(origin).unwrap(),
            routes: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn respond(self, url: &str, status: u16, body: &'static str) -> Self {
        self.respond_with_headers(url, status, body, header::HeaderMap::new())
    }

    pub(crate) fn respond_with_headers(
        self, url: &str, status: u16, body: &'static str, headers: header::HeaderMap,
    ) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Route::Respond { status, body, headers, delay: None });
        self
    }

    /// Respond `200` after `delay`, like a slow asset server.
    pub(crate) fn respond_slowly(self, url: &str, body: &'static str, delay: Duration) -> Self {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Route::Respond { status: 200, body, headers: header::HeaderMap::new(), delay: Some(delay) },
        );
        self
    }

    pub(crate) fn fail(self, url: &str) -> Self {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Fail);
        self
    }

    /// Take a URL offline after the fact.
    pub(crate) fn go_offline(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Fail);
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait::async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &CacheRequest) -> Result<FetchResponse, Error> {
        let url = request.url.to_string();
        *self.calls.lock().unwrap().entry(url.clone()).or_insert(0) += 1;

        let route = match self.routes.lock().unwrap().get(&url) {
            Some(Route::Respond { status, body, headers, delay }) => Some((*status, *body, headers.clone(), *delay)),
            Some(Route::Fail) | None => None,
        };
        let Some((status, body, mut headers, delay)) = route else {
            return Err(Error::HttpError(format!("network error for {url}: connection refused")));
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        headers
            .entry(header::CONTENT_TYPE)
            .or_insert(header::HeaderValue::from_static("text/plain"));
        Ok(FetchResponse {
            url: request.url.clone(),
            final_url: request.url.clone(),
            status: StatusCode::from_u16(status).unwrap(),
            content_type: Some("text/plain".to_string()),
            bytes: Bytes::from_static(body.as_bytes()),
            response_type: classify_response(Some(&self.origin), &request.url, &headers),
            headers,
            fetch_ms: 1,
        })
    }
}
