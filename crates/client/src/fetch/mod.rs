//! Network fetch pipeline.
//!
//! ### URL Resolution
//! - Trim whitespace, join relative entries onto the app scope
//! - Lowercase host, remove fragments, preserve query string
//! - Only `http`/`https`
//!
//! ### Transport
//! - Any HTTP status is a response; transport failures, timeouts and
//!   oversize bodies are errors
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//!
//! ### Response type
//! - `basic` for same-origin, `cors` / `opaque` for cross-origin responses

pub mod request;
pub mod response;
pub mod url;

use reqwest::Client;
pub use reqwest::header;
pub use reqwest::{Method, StatusCode};
use std::time::{Duration, Instant};

pub use request::CacheRequest;
pub use response::{FetchResponse, classify_response};
pub use self::url::{UrlError, parse_base, resolve};

use precache_core::{AppConfig, Error};

/// Something that can perform a network fetch.
///
/// The worker never talks to reqwest directly, so hosts and tests can
/// substitute their own transport.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    /// Issue `request` to the network.
    async fn fetch(&self, request: &CacheRequest) -> Result<FetchResponse, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "precache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// App origin used to classify responses (default: none, all `basic`)
    pub origin: Option<::url::Url>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "precache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
            origin: None,
        }
    }
}

impl FetchConfig {
    /// Build the fetch configuration from application settings.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = parse_base(&config.base_url).map_err(|e| Error::InvalidUrl(format!("base_url: {e}")))?;
        Ok(Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            origin: Some(origin),
            ..Default::default()
        })
    }
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn check_size(&self, len: usize) -> Result<(), Error> {
        if len > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }
        Ok(())
    }
}

fn transport_error(url: &::url::Url, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: {err}"))
    } else {
        Error::HttpError(format!("network error for {url}: {err}"))
    }
}

#[async_trait::async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &CacheRequest) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| transport_error(&request.url, e))?;

        if let Some(len) = response.content_length() {
            self.check_size(len as usize)?;
        }

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let bytes = response.bytes().await.map_err(|e| transport_error(&request.url, e))?;
        self.check_size(bytes.len())?;

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let response_type = classify_response(self.config.origin.as_ref(), &final_url, &headers);

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} {} -> {} {} in {}ms ({} bytes, {})",
            request.method,
            request.url,
            final_url,
            status.as_u16(),
            fetch_ms,
            bytes.len(),
            response_type
        );

        Ok(FetchResponse {
            url: request.url.clone(),
            final_url,
            status,
            content_type,
            bytes,
            headers,
            response_type,
            fetch_ms,
        })
    }
}
