//! MCP (Model Context Protocol) server library.
//!
//! This crate provides the server half of MCP over stdio: JSON-RPC 2.0
//! protocol types, a line-delimited serve loop, and the logging context
//! handed to tool handlers.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{CallToolResult, Context, Server, Tool, ToolRouter};
//! use serde_json::Value;
//!
//! struct Echo;
//!
//! impl ToolRouter for Echo {
//!     fn tools(&self) -> Vec<Tool> {
//!         vec![Tool {
//!             name: "echo".into(),
//!             description: Some("Echo the input".into()),
//!             input_schema: serde_json::json!({"type": "object"}),
//!         }]
//!     }
//!
//!     async fn call(&self, _name: &str, arguments: Option<Value>, ctx: Context) -> CallToolResult {
//!         ctx.info("echoing");
//!         CallToolResult::text(arguments.map(|a| a.to_string()).unwrap_or_default())
//!     }
//! }
//!
//! # async fn example() -> mcp::Result<()> {
//! Server::new(Echo, "echo-server", "0.1.0").serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;
mod protocol;
mod server;

pub use context::Context;
pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, LogLevel, RequestId, ServerCapabilities, ServerInfo, Tool,
    ToolContent,
};
pub use server::{MAX_REQUEST_SIZE, PROTOCOL_VERSION, Server, ToolRouter};
