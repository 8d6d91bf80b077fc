//! Parameter tools for reading and writing element parameters.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::{handler, parse_args, respond, tool};
use crate::client::RevitClient;
use crate::error::Result;
use crate::registry::Registry;

#[derive(Debug, Deserialize)]
struct GetParameterArgs {
    element_id: i64,
    parameter_name: String,
}

#[derive(Debug, Deserialize)]
struct SetParameterArgs {
    element_id: i64,
    parameter_name: String,
    value: Value,
}

#[derive(Debug, Deserialize)]
struct GetAllParametersArgs {
    element_id: i64,
    #[serde(default)]
    include_empty: bool,
    #[serde(default = "default_true")]
    include_readonly: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct SetParametersBulkArgs {
    element_id: i64,
    parameters: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SetParametersMultiArgs {
    element_ids: Vec<i64>,
    parameters: Map<String, Value>,
}

pub fn register(registry: &mut Registry, client: &Arc<RevitClient>) -> Result<()> {
    let c = Arc::clone(client);
    registry.register(
        tool(
            "get_element_parameter",
            "Get a single parameter value from a Revit element. Searches both \
             instance and type parameters (case-insensitive name match).",
            json!({
                "type": "object",
                "properties": {
                    "element_id": {"type": "integer", "description": "The Revit element ID"},
                    "parameter_name": {"type": "string", "description": "Parameter name (case-insensitive)"}
                },
                "required": ["element_id", "parameter_name"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: GetParameterArgs = match parse_args("get_element_parameter", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                ctx.info(format!(
                    "Getting parameter '{}' from element {}",
                    args.parameter_name, args.element_id
                ));
                let payload = json!({
                    "element_id": args.element_id,
                    "parameter_name": args.parameter_name,
                });
                respond(client.post("/get_parameter/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "set_element_parameter",
            "Set a parameter value on a Revit element. The backend converts the \
             value to the parameter's storage type (string, number, yes/no).",
            json!({
                "type": "object",
                "properties": {
                    "element_id": {"type": "integer", "description": "The Revit element ID"},
                    "parameter_name": {"type": "string", "description": "Parameter name (case-insensitive)"},
                    "value": {"description": "New value for the parameter"}
                },
                "required": ["element_id", "parameter_name", "value"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: SetParameterArgs = match parse_args("set_element_parameter", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                ctx.info(format!(
                    "Setting parameter '{}' = '{}' on element {}",
                    args.parameter_name, args.value, args.element_id
                ));
                let payload = json!({
                    "element_id": args.element_id,
                    "parameter_name": args.parameter_name,
                    "value": args.value,
                });
                respond(client.post("/set_parameter/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "get_all_parameters",
            "Get ALL parameters from a Revit element (instance + type), grouped by kind",
            json!({
                "type": "object",
                "properties": {
                    "element_id": {"type": "integer", "description": "The Revit element ID"},
                    "include_empty": {"type": "boolean", "description": "Include parameters with no value", "default": false},
                    "include_readonly": {"type": "boolean", "description": "Include read-only parameters", "default": true}
                },
                "required": ["element_id"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: GetAllParametersArgs = match parse_args("get_all_parameters", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                ctx.info(format!("Getting all parameters from element {}", args.element_id));
                let payload = json!({
                    "element_id": args.element_id,
                    "include_empty": args.include_empty,
                    "include_readonly": args.include_readonly,
                });
                respond(client.post("/get_all_parameters/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "set_parameters_bulk",
            "Set multiple parameters on a single element in one transaction",
            json!({
                "type": "object",
                "properties": {
                    "element_id": {"type": "integer", "description": "The Revit element ID"},
                    "parameters": {"type": "object", "description": "parameter_name: value pairs"}
                },
                "required": ["element_id", "parameters"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: SetParametersBulkArgs =
                    match parse_args("set_parameters_bulk", arguments) {
                        Ok(args) => args,
                        Err(result) => return result,
                    };
                ctx.info(format!(
                    "Setting {} parameters on element {}",
                    args.parameters.len(),
                    args.element_id
                ));
                let payload = json!({
                    "element_id": args.element_id,
                    "parameters": args.parameters,
                });
                respond(client.post("/set_parameters_bulk/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "set_parameters_multi_elements",
            "Set the same parameter(s) on multiple elements in one transaction",
            json!({
                "type": "object",
                "properties": {
                    "element_ids": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "description": "Revit element IDs"
                    },
                    "parameters": {"type": "object", "description": "parameter_name: value pairs"}
                },
                "required": ["element_ids", "parameters"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: SetParametersMultiArgs =
                    match parse_args("set_parameters_multi_elements", arguments) {
                        Ok(args) => args,
                        Err(result) => return result,
                    };
                ctx.info(format!("Setting parameters on {} elements", args.element_ids.len()));
                let payload = json!({
                    "element_ids": args.element_ids,
                    "parameters": args.parameters,
                });
                respond(client.post("/set_parameters_multi/", &payload, &ctx, None).await)
            }
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_all_parameters_defaults() {
        let args: GetAllParametersArgs =
            serde_json::from_value(json!({"element_id": 12345})).unwrap();
        assert!(!args.include_empty);
        assert!(args.include_readonly);
    }

    #[test]
    fn set_parameter_accepts_any_json_value() {
        let args: SetParameterArgs = serde_json::from_value(json!({
            "element_id": 12345,
            "parameter_name": "Height",
            "value": 2400
        }))
        .unwrap();
        assert_eq!(args.value, json!(2400));

        let args: SetParameterArgs = serde_json::from_value(json!({
            "element_id": 12345,
            "parameter_name": "Mark",
            "value": "A-101"
        }))
        .unwrap();
        assert_eq!(args.value, json!("A-101"));
    }
}
