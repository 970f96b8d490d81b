//! cache_delete tool implementation.
//!
//! Deletes a named cache store and everything in it.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Name of the store to delete.
    pub store: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub store: String,
    /// False if no such store existed.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(state: &AppState, params: CacheDeleteParams) -> Result<CallToolResult, McpError> {
    if params.store.trim().is_empty() {
        return Err(ToolError::InvalidInput("store cannot be empty".into()).into());
    }

    let deleted = state.registration.db().delete_store(&params.store).await?;
    if deleted {
        tracing::info!("deleted cache store {} on request", params.store);
    }

    json_result(&CacheDeleteOutput { store: params.store, deleted })
}
