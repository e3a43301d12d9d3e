// src/mcp/response.rs
// Response helpers for MCP tool results

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::json;

use crate::client::SearchResult;
use crate::error::{ErrorKind, FirebaseError};

/// Map a library error onto the MCP error space
pub fn to_mcp_err(e: FirebaseError) -> McpError {
    match e.kind() {
        ErrorKind::MalformedInput => McpError::invalid_params(e.to_user_string(), None),
        ErrorKind::Precondition | ErrorKind::Store => {
            McpError::internal_error(e.to_user_string(), None)
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

/// Records as a JSON array, followed by a `skippedFilters` block when any
/// filter entries were dropped.
pub fn search_response<T: Serialize>(result: SearchResult<T>) -> Result<CallToolResult, McpError> {
    let mut content = vec![Content::text(to_json(&result.records)?)];
    if !result.skipped.is_empty() {
        content.push(Content::text(to_json(&json!({ "skippedFilters": result.skipped }))?));
    }
    Ok(CallToolResult::success(content))
}
