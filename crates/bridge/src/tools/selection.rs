//! Selection and inspection tools.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use super::{handler, parse_args, respond, tool};
use crate::client::RevitClient;
use crate::error::Result;
use crate::registry::Registry;

#[derive(Debug, Deserialize)]
struct InspectSelectedArgs {
    #[serde(default)]
    index: i64,
}

#[derive(Debug, Deserialize)]
struct InspectElementArgs {
    element_id: i64,
}

#[derive(Debug, Deserialize)]
struct QuickCountArgs {
    category: String,
    #[serde(default)]
    type_contains: Option<String>,
    #[serde(default)]
    type_excludes: Option<Vec<String>>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    in_view: bool,
}

fn quick_count_payload(args: &QuickCountArgs) -> Value {
    let mut payload = json!({
        "category": args.category,
        "in_view": args.in_view,
    });
    // Filters are forwarded only when given; an explicitly empty filter
    // means "no filter" and is omitted like an absent one.
    if let Some(type_contains) = &args.type_contains
        && !type_contains.is_empty()
    {
        payload["type_contains"] = json!(type_contains);
    }
    if let Some(type_excludes) = &args.type_excludes
        && !type_excludes.is_empty()
    {
        payload["type_excludes"] = json!(type_excludes);
    }
    if let Some(level) = &args.level
        && !level.is_empty()
    {
        payload["level"] = json!(level);
    }
    payload
}

pub fn register(registry: &mut Registry, client: &Arc<RevitClient>) -> Result<()> {
    let c = Arc::clone(client);
    registry.register(
        tool(
            "get_active_selection",
            "Get details about currently selected elements in Revit: total count, \
             elements grouped by category, element IDs, and detail for the first one",
            json!({"type": "object", "properties": {}}),
        ),
        handler(move |_arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                ctx.info("Getting active selection info...");
                respond(client.get("/active_selection/", &ctx, None, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "inspect_selected_element",
            "Get detailed information about a specific selected element by index",
            json!({
                "type": "object",
                "properties": {
                    "index": {
                        "type": "integer",
                        "description": "0-based index into the selection set",
                        "default": 0
                    }
                }
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: InspectSelectedArgs =
                    match parse_args("inspect_selected_element", arguments) {
                        Ok(args) => args,
                        Err(result) => return result,
                    };
                ctx.info(format!("Inspecting selected element at index {}...", args.index));
                let path = format!("/inspect_selected/{}", args.index);
                respond(client.get(&path, &ctx, None, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "inspect_element",
            "Get comprehensive information about ANY element by its ID: basic info, \
             location, bounding box, level, host, all parameters, geometry summary",
            json!({
                "type": "object",
                "properties": {
                    "element_id": {"type": "integer", "description": "The Revit element ID to inspect"}
                },
                "required": ["element_id"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: InspectElementArgs = match parse_args("inspect_element", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                ctx.info(format!("Inspecting element ID {}...", args.element_id));
                let path = format!("/inspect_element/{}", args.element_id);
                respond(client.get(&path, &ctx, None, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "get_link_status",
            "Get information about all linked models: load status, pinned state, \
             transforms, document paths, and element counts per category",
            json!({"type": "object", "properties": {}}),
        ),
        handler(move |_arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                ctx.info("Getting link status...");
                respond(client.get("/link_status/", &ctx, None, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "quick_count",
            "Fast element count with filters. Much faster than getting full element \
             details; returns count, applied filters, and the first 100 element IDs.",
            json!({
                "type": "object",
                "properties": {
                    "category": {"type": "string", "description": "Category name to count (e.g. \"Windows\", \"Walls\")"},
                    "type_contains": {"type": "string", "description": "Only count elements whose type name contains this"},
                    "type_excludes": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Exclude elements whose type name contains any of these"
                    },
                    "level": {"type": "string", "description": "Only count elements on this level"},
                    "in_view": {"type": "boolean", "description": "Only count elements visible in the current view", "default": false}
                },
                "required": ["category"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: QuickCountArgs = match parse_args("quick_count", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                ctx.info(format!("Quick count for category: {}", args.category));
                let payload = quick_count_payload(&args);
                respond(client.post("/quick_count/", &payload, &ctx, None).await)
            }
        }),
    )?;

    Ok(())
}
