//! Tool-level errors for the precache server.
//!
//! Errors from the cache and worker layers convert through
//! `precache_core::Error`; these cover bad tool arguments.

use precache_core::ConfigError;
use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid tool arguments (e.g., an unknown HTTP method).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A derived worker configuration failed validation.
    #[error("INVALID_INPUT: {0}")]
    Config(#[from] ConfigError),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let message = match &err {
            ToolError::InvalidInput(msg) => msg.clone(),
            ToolError::Config(e) => e.to_string(),
        };

        McpError { code: ErrorCode(-32602), message: message.into(), data: None }
    }
}
