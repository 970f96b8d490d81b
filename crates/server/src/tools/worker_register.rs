//! worker_register tool implementation.
//!
//! Installs a new worker version derived from the boot configuration.

use precache_client::WorkerConfig;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;
use crate::state::AppState;

/// Input parameters for the worker_register tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerRegisterParams {
    /// Version label of the new worker; names its cache store.
    pub version: String,

    /// Manifest override (default: the configured manifest).
    #[serde(default)]
    pub manifest: Option<Vec<String>>,

    /// Override whether the new worker skips waiting.
    #[serde(default)]
    pub skip_waiting: Option<bool>,
}

/// Implementation of the worker_register tool.
pub async fn register_impl(state: &AppState, params: WorkerRegisterParams) -> Result<CallToolResult, McpError> {
    let mut app = state.config.clone();
    app.version = params.version.trim().to_string();
    if let Some(manifest) = params.manifest {
        app.manifest = manifest;
    }
    if let Some(skip_waiting) = params.skip_waiting {
        app.skip_waiting = skip_waiting;
    }
    app.validate().map_err(ToolError::from)?;

    let worker = WorkerConfig::from_app(&app)?;
    let report = state.registration.register(worker).await?;

    json_result(&report)
}
