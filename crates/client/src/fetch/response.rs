//! Network responses and their stored snapshots.

use bytes::Bytes;
use precache_core::{Error, ResponseType, StoredResponse};
use reqwest::{StatusCode, header};
use url::Url;

/// Response from a fetch, either off the network or rebuilt from a store.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Relation of the final URL to the app origin
    pub response_type: ResponseType,
    /// Time taken to produce the response in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Duplicate this response into an independent snapshot for the store.
    ///
    /// The snapshot owns its own header list and body handle, so writing it
    /// never consumes what is returned to the caller.
    pub fn to_stored(&self) -> StoredResponse {
        let headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        StoredResponse {
            method: "GET".to_string(),
            url: self.url.to_string(),
            final_url: self.final_url.to_string(),
            status: self.status.as_u16(),
            response_type: self.response_type,
            content_type: self.content_type.clone(),
            headers_json: serde_json::to_string(&headers).unwrap_or_else(|_| "[]".to_string()),
            body: self.bytes.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Rebuild a response from a stored snapshot, verbatim.
    pub fn from_stored(entry: StoredResponse) -> Result<Self, Error> {
        let url = Url::parse(&entry.url).map_err(|e| Error::CorruptEntry(format!("url {}: {e}", entry.url)))?;
        let final_url = Url::parse(&entry.final_url)
            .map_err(|e| Error::CorruptEntry(format!("final url {}: {e}", entry.final_url)))?;
        let status = StatusCode::from_u16(entry.status)
            .map_err(|e| Error::CorruptEntry(format!("status {} for {}: {e}", entry.status, entry.url)))?;

        let mut headers = header::HeaderMap::new();
        for (name, value) in entry.headers()? {
            match (header::HeaderName::from_bytes(name.as_bytes()), header::HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::debug!("skipping unreadable stored header {name} for {}", entry.url),
            }
        }

        Ok(Self {
            url,
            final_url,
            status,
            content_type: entry.content_type,
            bytes: Bytes::from(entry.body),
            headers,
            response_type: entry.response_type,
            fetch_ms: 0,
        })
    }
}

/// Classify a response by where it came from.
///
/// - same origin as the app: `basic`
/// - cross-origin with an `Access-Control-Allow-Origin` admitting the app: `cors`
/// - any other cross-origin response: `opaque`
///
/// Without a configured app origin every response counts as `basic`.
pub fn classify_response(origin: Option<&Url>, final_url: &Url, headers: &header::HeaderMap) -> ResponseType {
    let Some(origin) = origin else {
        return ResponseType::Basic;
    };

    if final_url.origin() == origin.origin() {
        return ResponseType::Basic;
    }

    let app_origin = origin.origin().ascii_serialization();
    let allowed = headers
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .is_some_and(|v| v == "*" || v == app_origin);

    if allowed { ResponseType::Cors } else { ResponseType::Opaque }
}
