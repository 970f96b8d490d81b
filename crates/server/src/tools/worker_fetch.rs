//! worker_fetch tool implementation.
//!
//! Issues a request as an open page would, so it goes through the active
//! worker's cache-first handler.

use precache_client::fetch::{CacheRequest, Method};
use precache_client::ClientId;
use precache_core::ResponseType;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{body_preview, json_result};
use crate::error::ToolError;
use crate::state::AppState;

/// Input parameters for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// URL to request, absolute or relative to the app base URL.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are intercepted.
    #[serde(default = "default_method")]
    pub method: String,

    /// Page issuing the request (default: the page opened at startup).
    #[serde(default)]
    pub client_id: Option<u64>,

    /// Optional Accept header, e.g. "text/html" for a navigation.
    #[serde(default)]
    pub accept: Option<String>,

    /// Maximum characters of body to return (default: 2000).
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_method() -> String {
    "GET".into()
}

fn default_preview_chars() -> usize {
    2000
}

/// Output structure for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    pub url: String,
    pub final_url: String,
    /// One of "cache", "network", "fallback", "passthrough".
    pub source: String,
    pub status: u16,
    pub response_type: ResponseType,
    /// Whether a copy of a network response was stored.
    pub stored: bool,
    pub content_type: Option<String>,
    pub body_bytes: usize,
    pub body_preview: String,
    pub truncated: bool,
    pub fetch_ms: u64,
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(state: &AppState, params: WorkerFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }

    let method = Method::from_bytes(params.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ToolError::InvalidInput(format!("unsupported method: {}", params.method)))?;
    let url = state.resolve_url(&params.url)?;

    let mut request = CacheRequest::new(method, url);
    if let Some(accept) = params.accept.as_deref() {
        request = request.with_header("accept", accept);
    }

    let client = params.client_id.map(ClientId).unwrap_or(state.client);
    let served = state.registration.dispatch_fetch(Some(client), &request).await?;

    let response = served.response;
    let (body_preview, truncated) = body_preview(&response.bytes, params.preview_chars);
    let output = WorkerFetchOutput {
        url: response.url.to_string(),
        final_url: response.final_url.to_string(),
        source: served.source.as_str().to_string(),
        status: response.status.as_u16(),
        response_type: response.response_type,
        stored: served.stored,
        content_type: response.content_type,
        body_bytes: response.bytes.len(),
        body_preview,
        truncated,
        fetch_ms: response.fetch_ms,
    };

    json_result(&output)
}
