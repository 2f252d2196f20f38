//! MCP Server protocol implementation
//!
//! Handles JSON-RPC 2.0 requests for `initialize`, `ping`, `tools/list` and
//! `tools/call`. Reading and writing the transport (stdio, HTTP) is left to
//! the embedding process.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use epr_core::{ApiClient, CallContext, Operation};

use crate::error::{McpError, McpResult};
use crate::tools::{call_tool, tool_definitions, ToolCall};
use crate::{PROTOCOL_VERSION, SERVER_INSTRUCTIONS, SERVER_NAME, SERVER_VERSION};

/// MCP JSON-RPC request
#[derive(Debug, Clone, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// MCP JSON-RPC response
#[derive(Debug, Clone, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpRpcError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct McpRpcError {
    pub code: i32,
    pub message: String,
}

impl McpResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, err: &McpError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(McpRpcError {
                code: err.error_code(),
                message: err.to_string(),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// MCP server exposing the nine EPR tools over an [`ApiClient`]
pub struct EprMcpServer<C> {
    client: C,
    call_context: CallContext,
}

impl<C: ApiClient> EprMcpServer<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            call_context: CallContext::default(),
        }
    }

    /// Context passed to the client on every tool call
    pub fn with_call_context(mut self, ctx: CallContext) -> Self {
        self.call_context = ctx;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Handle one raw JSON-RPC message
    pub async fn handle_message(&self, line: &str) -> McpResponse {
        match serde_json::from_str::<McpRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => McpResponse::failure(None, &McpError::from(e)),
        }
    }

    /// Handle an MCP request
    pub async fn handle_request(&self, request: McpRequest) -> McpResponse {
        if request.jsonrpc != "2.0" {
            let err = McpError::InvalidRequest(format!(
                "unsupported jsonrpc version '{}'",
                request.jsonrpc
            ));
            return McpResponse::failure(request.id, &err);
        }

        tracing::debug!(method = %request.method, "Handling MCP request");

        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(request.params).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        match result {
            Ok(value) => McpResponse::success(request.id, value),
            Err(err) => {
                tracing::warn!(code = err.error_code(), error = %err, "MCP request failed");
                McpResponse::failure(request.id, &err)
            }
        }
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            },
            "capabilities": {
                "tools": {}
            },
            "instructions": SERVER_INSTRUCTIONS
        })
    }

    fn handle_tools_list(&self) -> Value {
        json!({ "tools": tool_definitions() })
    }

    async fn handle_tools_call(&self, params: Value) -> McpResult<Value> {
        let call: ToolCall = serde_json::from_value(params)
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;
        let operation: Operation = call
            .name
            .parse()
            .map_err(|_| McpError::ToolNotFound(call.name.clone()))?;

        let result = call_tool(&self.client, operation, call.arguments, &self.call_context).await;
        tool_result_value(&result)
    }
}

fn tool_result_value(result: &impl Serialize) -> McpResult<Value> {
    serde_json::to_value(result).map_err(|e| McpError::Internal(e.to_string()))
}
