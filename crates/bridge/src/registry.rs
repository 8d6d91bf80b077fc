//! Tool registry.
//!
//! The registry is built once at startup by [`crate::tools::build_registry`]
//! and never mutated afterwards. Registration is the only fallible step:
//! a duplicate tool name is a fatal startup error.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use mcp::{CallToolResult, Context, Tool, ToolRouter};
use serde_json::Value;

use crate::error::{Error, Result};

/// A registered tool handler. Captures its transport client, endpoint path,
/// and timeout; receives the raw arguments object and the logging context.
pub type Handler = Box<
    dyn Fn(Option<Value>, Context) -> Pin<Box<dyn Future<Output = CallToolResult> + Send>>
        + Send
        + Sync,
>;

struct ToolDef {
    tool: Tool,
    handler: Handler,
}

/// Immutable collection of named tools, dispatchable by the MCP server.
#[derive(Default)]
pub struct Registry {
    defs: Vec<ToolDef>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken.
    pub fn register(&mut self, tool: Tool, handler: Handler) -> Result<()> {
        if self.by_name.contains_key(&tool.name) {
            return Err(Error::DuplicateTool(tool.name));
        }
        self.by_name.insert(tool.name.clone(), self.defs.len());
        self.defs.push(ToolDef { tool, handler });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|def| def.tool.name.as_str())
    }
}

impl ToolRouter for Registry {
    fn tools(&self) -> Vec<Tool> {
        self.defs.iter().map(|def| def.tool.clone()).collect()
    }

    async fn call(&self, name: &str, arguments: Option<Value>, ctx: Context) -> CallToolResult {
        match self.by_name.get(name) {
            Some(&index) => (self.defs[index].handler)(arguments, ctx).await,
            // Unknown tool is a tool-level failure, not a protocol error.
            None => CallToolResult::text(format!("Tool not found: {name}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_tool(name: &str) -> Tool {
        Tool {
            name: name.to_string(),
            description: None,
            input_schema: serde_json::json!({"type": "object"}),
        }
    }

    fn stub_handler(reply: &'static str) -> Handler {
        Box::new(move |_args, _ctx| Box::pin(async move { CallToolResult::text(reply) }))
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = Registry::new();
        registry.register(stub_tool("a"), stub_handler("x")).unwrap();
        let err = registry.register(stub_tool("a"), stub_handler("y")).unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(name) if name == "a"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn dispatch_by_name() {
        let mut registry = Registry::new();
        registry.register(stub_tool("a"), stub_handler("from a")).unwrap();
        registry.register(stub_tool("b"), stub_handler("from b")).unwrap();

        let result = registry.call("b", None, Context::detached()).await;
        assert_eq!(result.content[0].as_text(), Some("from b"));
    }

    #[tokio::test]
    async fn unknown_tool_returns_text_error() {
        let registry = Registry::new();
        let result = registry.call("missing", None, Context::detached()).await;
        assert_eq!(result.content[0].as_text(), Some("Tool not found: missing"));
        assert!(!result.is_error);
    }
}
