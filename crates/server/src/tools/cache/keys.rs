//! cache_keys tool implementation.
//!
//! Lists cache stores and the URLs stored in each.

use precache_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Only list this store (default: every store).
    #[serde(default)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreKeys {
    pub name: String,
    /// Whether this is the active worker's store.
    pub current: bool,
    pub urls: Vec<String>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    pub stores: Vec<StoreKeys>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(state: &AppState, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let db = state.registration.db();

    let names = match params.store {
        Some(name) => {
            if !db.has_store(&name).await? {
                return Err(Error::CacheMiss(format!("no cache store named {name}")).into());
            }
            vec![name]
        }
        None => db.store_names().await?,
    };

    let current = state.current_store().await;
    let mut stores = Vec::with_capacity(names.len());
    for name in names {
        let urls = db.open_store(&name).await?.keys().await?;
        stores.push(StoreKeys { current: name == current, name, urls });
    }

    json_result(&CacheKeysOutput { stores })
}
