//! Error types for EPR MCP

use serde_json::{json, Value};
use thiserror::Error;

use epr_core::Operation;

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// Protocol-level failures, reported as JSON-RPC errors
///
/// Failures of a known tool are not protocol errors; they come back as tool
/// results with `isError` set.
#[derive(Error, Debug)]
pub enum McpError {
    /// Request line is not valid JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request is not a JSON-RPC 2.0 request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown JSON-RPC method
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Unknown tool name
    #[error("Unknown tool: '{0}'. Available tools: {available}", available = Operation::names().join(", "))]
    ToolNotFound(String),

    /// Malformed `tools/call` params
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Create an MCP-formatted error object
    pub fn to_mcp_error(&self) -> Value {
        json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string()
            }
        })
    }

    /// Get error code for MCP protocol
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::Parse(_) => -32700,
            McpError::InvalidRequest(_) => -32600,
            McpError::MethodNotFound(_) | McpError::ToolNotFound(_) => -32601,
            McpError::InvalidParams(_) => -32602,
            McpError::Internal(_) => -32603,
        }
    }
}
