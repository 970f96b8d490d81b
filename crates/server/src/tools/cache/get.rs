//! cache_get tool implementation.
//!
//! Retrieves one stored response by URL.

use precache_core::{Error, ResponseType};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::{body_preview, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// URL of the entry, absolute or relative to the app base URL.
    pub url: String,

    /// Store to look in (default: the active worker's store).
    #[serde(default)]
    pub store: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store: String,
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub response_type: ResponseType,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body_bytes: usize,
    pub body_preview: String,
    pub stored_at: String,
}

const PREVIEW_CHARS: usize = 2000;

/// Implementation of the cache_get tool.
pub async fn get_impl(state: &AppState, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = state.resolve_url(&params.url)?;
    let store_name = match params.store {
        Some(name) => name,
        None => state.current_store().await,
    };

    let db = state.registration.db();
    if !db.has_store(&store_name).await? {
        return Err(Error::CacheMiss(format!("no cache store named {store_name}")).into());
    }

    let entry = db
        .open_store(&store_name)
        .await?
        .match_request("GET", url.as_str())
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{url} is not in {store_name}")))?;

    let headers = entry.headers()?;
    let (body_preview, _) = body_preview(&entry.body, PREVIEW_CHARS);
    let output = CacheGetOutput {
        store: store_name,
        url: entry.url,
        final_url: entry.final_url,
        status: entry.status,
        response_type: entry.response_type,
        content_type: entry.content_type,
        headers,
        body_bytes: entry.body.len(),
        body_preview,
        stored_at: entry.stored_at,
    };

    json_result(&output)
}
