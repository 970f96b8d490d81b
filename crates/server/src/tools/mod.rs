//! MCP tool implementations.
//!
//! This module contains all tools exposed by the precache server.
#![allow(unused_imports)]

pub mod cache;
pub mod worker_fetch;
pub mod worker_register;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub use worker_fetch::{WorkerFetchOutput, WorkerFetchParams};
pub use worker_register::WorkerRegisterParams;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| precache_core::Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Lossy UTF-8 preview of a body, cut at `max_chars` characters.
pub(crate) fn body_preview(bytes: &[u8], max_chars: usize) -> (String, bool) {
    let text = String::from_utf8_lossy(bytes);
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    let truncated = chars.next().is_some();
    (preview, truncated)
}

#[cfg(test)]
pub(crate) fn output_text(result: &CallToolResult) -> String {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_preview() {
        assert_eq!(body_preview(b"hello", 10), ("hello".to_string(), false));
        assert_eq!(body_preview(b"hello", 3), ("hel".to_string(), true));
        assert_eq!(body_preview("héllo".as_bytes(), 2), ("hé".to_string(), true));
    }
}
