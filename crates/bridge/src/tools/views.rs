//! View tools: current view inspection and image export.
//!
//! `export_current_view` is the one tool bound to the binary transport verb;
//! it returns a base64 image content block instead of text.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mcp::CallToolResult;
use serde_json::json;

use super::{handler, respond, tool};
use crate::client::RevitClient;
use crate::error::Result;
use crate::registry::Registry;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(60);

pub fn register(registry: &mut Registry, client: &Arc<RevitClient>) -> Result<()> {
    let c = Arc::clone(client);
    registry.register(
        tool(
            "get_current_view_info",
            "Get information about the currently active view in Revit",
            json!({"type": "object", "properties": {}}),
        ),
        handler(move |_arguments, ctx| {
            let client = Arc::clone(&c);
            async move { respond(client.get("/current_view_info/", &ctx, None, None).await) }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "get_current_view_elements",
            "List the elements visible in the currently active view",
            json!({"type": "object", "properties": {}}),
        ),
        handler(move |_arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                respond(client.get("/current_view_elements/", &ctx, None, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "export_current_view",
            "Export the currently active view as an image",
            json!({"type": "object", "properties": {}}),
        ),
        handler(move |_arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                ctx.info("Exporting current view as image");
                let payload = json!({});
                match client
                    .post_binary("/export_current_view/", &payload, &ctx, Some(EXPORT_TIMEOUT))
                    .await
                {
                    Ok(image) => {
                        CallToolResult::image(STANDARD.encode(&image.data), image.mime_type)
                    }
                    Err(e) => CallToolResult::text(format!("Error exporting view: {e}")),
                }
            }
        }),
    )?;

    Ok(())
}
