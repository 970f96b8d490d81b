//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::AppState;
use crate::tools::cache::{CacheDeleteParams, CacheGetParams, CacheKeysParams, delete_impl, get_impl, keys_impl};
use crate::tools::worker_fetch::fetch_impl;
use crate::tools::worker_register::register_impl;
use crate::tools::{WorkerFetchParams, WorkerRegisterParams};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for precache.
#[derive(Clone)]
pub struct PrecacheServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl PrecacheServer {
    /// Create a new server handler over shared state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Issue a request through the active worker.
    #[tool(
        description = "Request a URL as an open page would. GET requests are answered cache-first by the active worker; reports whether the response came from the cache, the network, the offline fallback, or passed through."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.state, params.0).await
    }

    /// Register a new worker version.
    #[tool(
        description = "Install a new worker version: precache its manifest into a store named after the version, then activate it (deleting older stores) unless it must wait for open pages."
    )]
    async fn worker_register(&self, params: Parameters<WorkerRegisterParams>) -> Result<CallToolResult, McpError> {
        register_impl(&self.state, params.0).await
    }

    #[tool(description = "List cache stores and the request URLs stored in each.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(&self.state, params.0).await
    }

    #[tool(description = "Inspect one stored response by URL. Defaults to the active worker's store.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.state, params.0).await
    }

    #[tool(description = "Delete a named cache store and all of its entries.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.state, params.0).await
    }
}

impl ServerHandler for PrecacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "precache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
