//! EPR MCP Library
//!
//! Exposes the Event Provenance Registry operations as Model Context
//! Protocol tools.
//!
//! ## Architecture
//!
//! ```text
//! Agent (MCP client)
//!        │  JSON-RPC: initialize / tools/list / tools/call
//!        ▼
//! ┌──────────────────┐
//! │  EprMcpServer    │ ◄── This crate
//! │                  │
//! │  ┌────────────┐  │ - fetch_event    - search_events    - create_event
//! │  │   Tools    │  │ - fetch_receiver - search_receivers - create_receiver
//! │  │            │  │ - fetch_group    - search_groups    - create_group
//! │  └────────────┘  │
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     epr-core     │  validate → build → send → map
//! └────────┬─────────┘
//!          ▼
//!      ApiClient
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use epr_client::{ClientConfig, GraphQlClient, StaticBackend};
//! use epr_mcp::EprMcpServer;
//! use serde_json::json;
//!
//! let backend = StaticBackend::always(json!({"data": {"events": []}}));
//! let server = EprMcpServer::new(GraphQlClient::new(ClientConfig::default(), backend));
//!
//! let response = tokio_test::block_on(server.handle_message(
//!     r#"{"jsonrpc": "2.0", "id": 1, "method": "tools/call",
//!         "params": {"name": "search_events", "arguments": {"data": {}}}}"#,
//! ));
//! let result = response.result.unwrap();
//! assert_eq!(result["isError"], false);
//! ```

pub mod error;
pub mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use server::{EprMcpServer, McpRequest, McpResponse, McpRpcError};
pub use tools::{ToolCall, ToolContent, ToolDefinition, ToolResult};

/// Server metadata for MCP protocol
pub const SERVER_NAME: &str = "epr-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_INSTRUCTIONS: &str = "Tools for the Event Provenance Registry. \
Fetch tools take {\"id\": \"<26-character id>\"}; search and create tools take {\"data\": {...}}. \
Failed calls return isError with every invalid field listed.";
