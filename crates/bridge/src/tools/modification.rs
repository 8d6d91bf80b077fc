//! Modification tools: batch updates, sheets, walls, batch family placement.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use super::{handler, parse_args, respond, tool};
use crate::client::RevitClient;
use crate::error::Result;
use crate::registry::Registry;

const BATCH_PLACE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct BatchUpdateArgs {
    updates: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CreateSheetArgs {
    sheet_number: String,
    #[serde(default = "default_sheet_name")]
    sheet_name: String,
    #[serde(default)]
    title_block_name: String,
}

fn default_sheet_name() -> String {
    "New Sheet".to_string()
}

fn create_sheet_payload(args: &CreateSheetArgs) -> Value {
    let mut payload = json!({
        "sheet_number": args.sheet_number,
        "sheet_name": args.sheet_name,
    });
    if !args.title_block_name.is_empty() {
        payload["title_block_name"] = json!(args.title_block_name);
    }
    payload
}

#[derive(Debug, Deserialize)]
struct PlaceViewOnSheetArgs {
    #[serde(default)]
    sheet_id: i64,
    #[serde(default)]
    view_id: i64,
    #[serde(default)]
    sheet_number: String,
    #[serde(default)]
    view_name: String,
    #[serde(default = "default_sheet_x")]
    x: f64,
    #[serde(default = "default_sheet_y")]
    y: f64,
}

fn default_sheet_x() -> f64 {
    1.0
}

fn default_sheet_y() -> f64 {
    0.75
}

fn place_view_on_sheet_payload(args: &PlaceViewOnSheetArgs) -> Value {
    let mut payload = json!({"x": args.x, "y": args.y});
    if args.sheet_id != 0 {
        payload["sheet_id"] = json!(args.sheet_id);
    }
    if args.view_id != 0 {
        payload["view_id"] = json!(args.view_id);
    }
    if !args.sheet_number.is_empty() {
        payload["sheet_number"] = json!(args.sheet_number);
    }
    if !args.view_name.is_empty() {
        payload["view_name"] = json!(args.view_name);
    }
    payload
}

#[derive(Debug, Deserialize)]
struct CreateWallsArgs {
    #[serde(default)]
    line_ids: Vec<i64>,
    #[serde(default)]
    lines: Vec<Value>,
    #[serde(default)]
    wall_type_name: String,
    #[serde(default)]
    level_name: String,
    #[serde(default = "default_wall_height")]
    height: f64,
    #[serde(default)]
    structural: bool,
}

fn default_wall_height() -> f64 {
    3000.0
}

// line_ids and lines are always sent, empty or not: the backend distinguishes
// "no lines given" from "not specified" by the empty list.
fn create_walls_payload(args: &CreateWallsArgs) -> Value {
    let mut payload = json!({
        "line_ids": args.line_ids,
        "lines": args.lines,
        "height": args.height,
        "structural": args.structural,
    });
    if !args.wall_type_name.is_empty() {
        payload["wall_type_name"] = json!(args.wall_type_name);
    }
    if !args.level_name.is_empty() {
        payload["level_name"] = json!(args.level_name);
    }
    payload
}

#[derive(Debug, Deserialize)]
struct BatchPlacementArgs {
    family_name: String,
    placements: Vec<Value>,
    #[serde(default)]
    type_name: String,
    #[serde(default)]
    level_name: String,
}

fn batch_placement_payload(args: &BatchPlacementArgs) -> Value {
    let mut payload = json!({
        "family_name": args.family_name,
        "placements": args.placements,
    });
    if !args.type_name.is_empty() {
        payload["type_name"] = json!(args.type_name);
    }
    if !args.level_name.is_empty() {
        payload["level_name"] = json!(args.level_name);
    }
    payload
}

#[derive(Debug, Deserialize)]
struct WorkplaneWindowsArgs {
    symbol_id: i64,
    placements: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CoordinateConverterArgs {
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
    #[serde(default = "default_unit")]
    from_unit: String,
    #[serde(default = "default_unit")]
    to_unit: String,
    #[serde(default = "default_system")]
    from_system: String,
    #[serde(default = "default_system")]
    to_system: String,
}

fn default_unit() -> String {
    "mm".to_string()
}

fn default_system() -> String {
    "internal".to_string()
}

fn coordinate_converter_payload(args: &CoordinateConverterArgs) -> Value {
    json!({
        "coordinates": {"x": args.x, "y": args.y, "z": args.z},
        "from_unit": args.from_unit,
        "to_unit": args.to_unit,
        "from_system": args.from_system,
        "to_system": args.to_system,
    })
}

pub fn register(registry: &mut Registry, client: &Arc<RevitClient>) -> Result<()> {
    let c = Arc::clone(client);
    registry.register(
        tool(
            "batch_update",
            "Batch update parameters on multiple elements in a single transaction",
            json!({
                "type": "object",
                "properties": {
                    "updates": {
                        "type": "array",
                        "items": {"type": "object"},
                        "description": "Update objects, each with element_id and a parameters map"
                    }
                },
                "required": ["updates"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: BatchUpdateArgs = match parse_args("batch_update", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                ctx.info(format!("Batch updating {} elements", args.updates.len()));
                let payload = json!({"updates": args.updates});
                respond(client.post("/batch_update/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "create_sheet",
            "Create a new sheet in the Revit document",
            json!({
                "type": "object",
                "properties": {
                    "sheet_number": {"type": "string", "description": "The sheet number (e.g. \"A-101\")"},
                    "sheet_name": {"type": "string", "description": "The sheet name/title", "default": "New Sheet"},
                    "title_block_name": {"type": "string", "description": "Title block family to use (partial match); first available when empty"}
                },
                "required": ["sheet_number"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: CreateSheetArgs = match parse_args("create_sheet", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                ctx.info(format!("Creating sheet {} - {}", args.sheet_number, args.sheet_name));
                let payload = create_sheet_payload(&args);
                respond(client.post("/create_sheet/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "place_view_on_sheet",
            "Place a view on a sheet. Specify sheet and view by ID or by name.",
            json!({
                "type": "object",
                "properties": {
                    "sheet_id": {"type": "integer", "description": "ID of the sheet (use this OR sheet_number)"},
                    "view_id": {"type": "integer", "description": "ID of the view to place (use this OR view_name)"},
                    "sheet_number": {"type": "string", "description": "Sheet number like \"A-101\""},
                    "view_name": {"type": "string", "description": "Name of the view to place"},
                    "x": {"type": "number", "description": "X position on sheet in feet", "default": 1.0},
                    "y": {"type": "number", "description": "Y position on sheet in feet", "default": 0.75}
                }
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: PlaceViewOnSheetArgs =
                    match parse_args("place_view_on_sheet", arguments) {
                        Ok(args) => args,
                        Err(result) => return result,
                    };
                let identifier = if args.sheet_number.is_empty() {
                    args.sheet_id.to_string()
                } else {
                    args.sheet_number.clone()
                };
                ctx.info(format!("Placing view on sheet {identifier}"));
                let payload = place_view_on_sheet_payload(&args);
                respond(client.post("/place_view_on_sheet/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "create_walls_at_lines",
            "Create walls from existing model lines or from coordinate pairs in mm",
            json!({
                "type": "object",
                "properties": {
                    "line_ids": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "description": "Element IDs of existing lines to convert to walls"
                    },
                    "lines": {
                        "type": "array",
                        "items": {"type": "object"},
                        "description": "Line definitions with start/end coordinates in mm"
                    },
                    "wall_type_name": {"type": "string", "description": "Wall type (partial match); first basic wall when empty"},
                    "level_name": {"type": "string", "description": "Level name (partial match); lowest level when empty"},
                    "height": {"type": "number", "description": "Wall height in millimeters", "default": 3000},
                    "structural": {"type": "boolean", "description": "Whether walls are structural", "default": false}
                }
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: CreateWallsArgs = match parse_args("create_walls_at_lines", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                let count = args.line_ids.len() + args.lines.len();
                ctx.info(format!("Creating walls from {count} lines"));
                let payload = create_walls_payload(&args);
                respond(client.post("/create_walls_at_lines/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "batch_family_placement",
            "Place multiple instances of a family at specified locations (coordinates in mm)",
            json!({
                "type": "object",
                "properties": {
                    "family_name": {"type": "string", "description": "Family to place (partial match)"},
                    "placements": {
                        "type": "array",
                        "items": {"type": "object"},
                        "description": "Placement locations: x/y/z in mm plus optional rotation in degrees"
                    },
                    "type_name": {"type": "string", "description": "Specific family type (partial match)"},
                    "level_name": {"type": "string", "description": "Level to place on (partial match)"}
                },
                "required": ["family_name", "placements"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: BatchPlacementArgs =
                    match parse_args("batch_family_placement", arguments) {
                        Ok(args) => args,
                        Err(result) => return result,
                    };
                ctx.info(format!(
                    "Placing {} instances of family '{}'",
                    args.placements.len(),
                    args.family_name
                ));
                let payload = batch_placement_payload(&args);
                respond(client.post("/batch_family_placement/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "place_workplane_windows",
            "Place WorkPlaneBased window families with correct vertical orientation. \
             Coordinates are the window center in mm; the normal vector points outward \
             from the wall face.",
            json!({
                "type": "object",
                "properties": {
                    "symbol_id": {"type": "integer", "description": "FamilySymbol ElementId of the window type"},
                    "placements": {
                        "type": "array",
                        "items": {"type": "object"},
                        "description": "Placement objects with x_mm/y_mm/z_mm, normal_x/normal_y, optional mark"
                    }
                },
                "required": ["symbol_id", "placements"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: WorkplaneWindowsArgs =
                    match parse_args("place_workplane_windows", arguments) {
                        Ok(args) => args,
                        Err(result) => return result,
                    };
                ctx.info(format!(
                    "Placing {} windows with symbol {}",
                    args.placements.len(),
                    args.symbol_id
                ));
                let payload = json!({
                    "symbol_id": args.symbol_id,
                    "placements": args.placements,
                });
                respond(
                    client
                        .post("/place_workplane_windows/", &payload, &ctx, Some(BATCH_PLACE_TIMEOUT))
                        .await,
                )
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "coordinate_converter",
            "Convert coordinates between units (mm, m, ft, in) and coordinate systems \
             (internal, project, shared)",
            json!({
                "type": "object",
                "properties": {
                    "x": {"type": "number"},
                    "y": {"type": "number"},
                    "z": {"type": "number", "default": 0},
                    "from_unit": {"type": "string", "enum": ["mm", "m", "ft", "in"], "default": "mm"},
                    "to_unit": {"type": "string", "enum": ["mm", "m", "ft", "in"], "default": "mm"},
                    "from_system": {"type": "string", "enum": ["internal", "project", "shared"], "default": "internal"},
                    "to_system": {"type": "string", "enum": ["internal", "project", "shared"], "default": "internal"}
                },
                "required": ["x", "y"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: CoordinateConverterArgs =
                    match parse_args("coordinate_converter", arguments) {
                        Ok(args) => args,
                        Err(result) => return result,
                    };
                ctx.info(format!(
                    "Converting coordinates from {} {} to {} {}",
                    args.from_unit, args.from_system, args.to_unit, args.to_system
                ));
                let payload = coordinate_converter_payload(&args);
                respond(client.post("/coordinate_converter/", &payload, &ctx, None).await)
            }
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_sheet_omits_empty_title_block() {
        let args: CreateSheetArgs =
            serde_json::from_value(json!({"sheet_number": "A-101"})).unwrap();
        let payload = create_sheet_payload(&args);
        assert_eq!(payload["sheet_number"], "A-101");
        assert_eq!(payload["sheet_name"], "New Sheet");
        assert!(payload.get("title_block_name").is_none());
    }

    #[test]
    fn place_view_on_sheet_sends_only_set_identifiers() {
        let args: PlaceViewOnSheetArgs = serde_json::from_value(json!({
            "sheet_number": "A-101",
            "view_name": "Level 1"
        }))
        .unwrap();
        let payload = place_view_on_sheet_payload(&args);
        assert_eq!(payload["x"], 1.0);
        assert_eq!(payload["y"], 0.75);
        assert_eq!(payload["sheet_number"], "A-101");
        assert_eq!(payload["view_name"], "Level 1");
        assert!(payload.get("sheet_id").is_none());
        assert!(payload.get("view_id").is_none());
    }

    #[test]
    fn create_walls_always_sends_empty_line_lists() {
        let args: CreateWallsArgs = serde_json::from_value(json!({
            "lines": [{"start": {"x": 0, "y": 0}, "end": {"x": 5000, "y": 0}}]
        }))
        .unwrap();
        let payload = create_walls_payload(&args);
        assert_eq!(payload["line_ids"], json!([]));
        assert_eq!(payload["lines"].as_array().unwrap().len(), 1);
        assert_eq!(payload["height"], 3000.0);
        assert_eq!(payload["structural"], false);
        assert!(payload.get("wall_type_name").is_none());
    }

    #[test]
    fn coordinate_converter_defaults() {
        let args: CoordinateConverterArgs =
            serde_json::from_value(json!({"x": 1000.0, "y": 2000.0})).unwrap();
        let payload = coordinate_converter_payload(&args);
        assert_eq!(payload["coordinates"], json!({"x": 1000.0, "y": 2000.0, "z": 0.0}));
        assert_eq!(payload["from_unit"], "mm");
        assert_eq!(payload["to_system"], "internal");
    }
}
