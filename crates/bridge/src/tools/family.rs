//! Family and placement tools.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{handler, parse_args, respond, tool};
use crate::client::RevitClient;
use crate::error::Result;
use crate::registry::Registry;

const BATCH_PLACE_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_LIST_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
struct PlaceFamilyArgs {
    family_name: String,
    #[serde(default)]
    type_name: Option<String>,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    z: f64,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    level_name: Option<String>,
    #[serde(default)]
    properties: Map<String, Value>,
}

fn place_family_payload(args: &PlaceFamilyArgs) -> Value {
    let mut payload = json!({
        "family_name": args.family_name,
        "location": {"x": args.x, "y": args.y, "z": args.z},
        "rotation": args.rotation,
        "properties": args.properties,
    });
    if let Some(type_name) = &args.type_name {
        payload["type_name"] = json!(type_name);
    }
    if let Some(level_name) = &args.level_name {
        payload["level_name"] = json!(level_name);
    }
    payload
}

#[derive(Debug, Deserialize)]
struct WorkplaneFamiliesArgs {
    symbol_id: i64,
    placements: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ListFamiliesArgs {
    #[serde(default)]
    contains: Option<String>,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

fn list_families_params(args: &ListFamiliesArgs) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(contains) = &args.contains
        && !contains.is_empty()
    {
        params.push(("contains", contains.clone()));
    }
    if args.limit != DEFAULT_LIST_LIMIT {
        params.push(("limit", args.limit.to_string()));
    }
    params
}

pub fn register(registry: &mut Registry, client: &Arc<RevitClient>) -> Result<()> {
    let c = Arc::clone(client);
    registry.register(
        tool(
            "place_family",
            "Place a family instance at a specified location in the Revit model",
            json!({
                "type": "object",
                "properties": {
                    "family_name": {"type": "string", "description": "Family name (partial match)"},
                    "type_name": {"type": "string", "description": "Specific family type to use"},
                    "x": {"type": "number", "default": 0.0},
                    "y": {"type": "number", "default": 0.0},
                    "z": {"type": "number", "default": 0.0},
                    "rotation": {"type": "number", "description": "Rotation in degrees", "default": 0.0},
                    "level_name": {"type": "string", "description": "Level to place on"},
                    "properties": {"type": "object", "description": "Parameter values to set after placement"}
                },
                "required": ["family_name"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: PlaceFamilyArgs = match parse_args("place_family", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                ctx.info(format!("Placing family '{}'", args.family_name));
                let payload = place_family_payload(&args);
                respond(client.post("/place_family/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "place_workplane_families",
            "Place WorkPlaneBased families on vertical planes (windows, doors, etc). \
             Batch placement by FamilySymbol ElementId; each placement carries x_mm, \
             y_mm, z_mm coordinates and the wall normal vector.",
            json!({
                "type": "object",
                "properties": {
                    "symbol_id": {"type": "integer", "description": "FamilySymbol ElementId (from list_families)"},
                    "placements": {
                        "type": "array",
                        "items": {"type": "object"},
                        "description": "Placement objects with x_mm/y_mm/z_mm, normal_x/normal_y/normal_z, optional rotate_180 and mark"
                    }
                },
                "required": ["symbol_id", "placements"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: WorkplaneFamiliesArgs =
                    match parse_args("place_workplane_families", arguments) {
                        Ok(args) => args,
                        Err(result) => return result,
                    };
                ctx.info(format!(
                    "Placing {} WorkPlaneBased families with symbol {}",
                    args.placements.len(),
                    args.symbol_id
                ));
                let payload = json!({
                    "symbol_id": args.symbol_id,
                    "placements": args.placements,
                });
                respond(
                    client
                        .post("/place_workplane_families/", &payload, &ctx, Some(BATCH_PLACE_TIMEOUT))
                        .await,
                )
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "list_families",
            "Get a flat list of available family types in the current Revit model",
            json!({
                "type": "object",
                "properties": {
                    "contains": {"type": "string", "description": "Filter to family names containing this string"},
                    "limit": {"type": "integer", "description": "Maximum number of results", "default": 50}
                }
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: ListFamiliesArgs = match parse_args("list_families", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                let params = list_families_params(&args);
                respond(
                    client
                        .get("/list_families/", &ctx, Some(&params), None)
                        .await,
                )
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "list_family_categories",
            "Get a list of all family categories in the current Revit model",
            json!({"type": "object", "properties": {}}),
        ),
        handler(move |_arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                respond(client.get("/list_family_categories/", &ctx, None, None).await)
            }
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_family_omits_absent_names_but_keeps_containers() {
        let args: PlaceFamilyArgs =
            serde_json::from_value(json!({"family_name": "Chair"})).unwrap();
        let payload = place_family_payload(&args);
        assert_eq!(payload["family_name"], "Chair");
        assert_eq!(payload["location"], json!({"x": 0.0, "y": 0.0, "z": 0.0}));
        assert_eq!(payload["rotation"], 0.0);
        // Empty properties map is sent explicitly; absent names are omitted.
        assert_eq!(payload["properties"], json!({}));
        assert!(payload.get("type_name").is_none());
        assert!(payload.get("level_name").is_none());
    }

    #[test]
    fn place_family_full_payload() {
        let args: PlaceFamilyArgs = serde_json::from_value(json!({
            "family_name": "Chair",
            "type_name": "Office",
            "x": 1000.0, "y": 2000.0, "z": 0.0,
            "rotation": 90.0,
            "level_name": "Level 1",
            "properties": {"Mark": "C-1"}
        }))
        .unwrap();
        let payload = place_family_payload(&args);
        assert_eq!(payload["type_name"], "Office");
        assert_eq!(payload["level_name"], "Level 1");
        assert_eq!(payload["properties"]["Mark"], "C-1");
    }

    #[test]
    fn list_families_omits_default_limit() {
        let args: ListFamiliesArgs = serde_json::from_value(json!({})).unwrap();
        assert!(list_families_params(&args).is_empty());

        let args: ListFamiliesArgs =
            serde_json::from_value(json!({"contains": "Window", "limit": 10})).unwrap();
        let params = list_families_params(&args);
        assert_eq!(params, vec![("contains", "Window".to_string()), ("limit", "10".to_string())]);
    }
}
