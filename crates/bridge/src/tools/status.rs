//! Status and model information tools.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::{handler, respond, tool};
use crate::client::RevitClient;
use crate::error::Result;
use crate::registry::Registry;

const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

pub fn register(registry: &mut Registry, client: &Arc<RevitClient>) -> Result<()> {
    let c = Arc::clone(client);
    registry.register(
        tool(
            "get_revit_status",
            "Check if the Revit MCP API is active and responding",
            json!({"type": "object", "properties": {}}),
        ),
        handler(move |_arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                respond(client.get("/status/", &ctx, None, Some(STATUS_TIMEOUT)).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "get_revit_model_info",
            "Get comprehensive information about the current Revit model",
            json!({"type": "object", "properties": {}}),
        ),
        handler(move |_arguments, ctx| {
            let client = Arc::clone(&c);
            async move { respond(client.get("/model_info/", &ctx, None, None).await) }
        }),
    )?;

    Ok(())
}
