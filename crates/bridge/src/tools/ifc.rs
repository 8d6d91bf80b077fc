//! IFC query tools: search elements in linked IFC models.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use super::{handler, parse_args, respond, tool};
use crate::client::RevitClient;
use crate::error::Result;
use crate::registry::Registry;

#[derive(Debug, Deserialize)]
struct QueryIfcArgs {
    #[serde(default)]
    link_name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    ifc_class: String,
    #[serde(default)]
    parameter_name: String,
    #[serde(default)]
    parameter_value: String,
    #[serde(default = "default_max_results")]
    max_results: i64,
}

fn default_max_results() -> i64 {
    100
}

// All filters are sent, empty or not; the backend treats empty as "no filter".
fn query_ifc_payload(args: &QueryIfcArgs) -> Value {
    json!({
        "link_name": args.link_name,
        "category": args.category,
        "ifc_class": args.ifc_class,
        "parameter_name": args.parameter_name,
        "parameter_value": args.parameter_value,
        "max_results": args.max_results,
    })
}

fn describe_filters(args: &QueryIfcArgs) -> String {
    let mut filters = Vec::new();
    if !args.link_name.is_empty() {
        filters.push(format!("link={}", args.link_name));
    }
    if !args.category.is_empty() {
        filters.push(format!("category={}", args.category));
    }
    if !args.ifc_class.is_empty() {
        filters.push(format!("ifc_class={}", args.ifc_class));
    }
    if !args.parameter_name.is_empty() {
        let value = if args.parameter_value.is_empty() {
            "*"
        } else {
            &args.parameter_value
        };
        filters.push(format!("{}={}", args.parameter_name, value));
    }
    if filters.is_empty() {
        "all".to_string()
    } else {
        filters.join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct IfcPropertiesArgs {
    link_instance_id: i64,
    element_id: i64,
}

pub fn register(registry: &mut Registry, client: &Arc<RevitClient>) -> Result<()> {
    let c = Arc::clone(client);
    registry.register(
        tool(
            "query_ifc_elements",
            "Search for elements in linked IFC models with flexible filtering. All \
             filters are optional and combined with AND logic.",
            json!({
                "type": "object",
                "properties": {
                    "link_name": {"type": "string", "description": "Filter by linked model name (partial, case-insensitive)"},
                    "category": {"type": "string", "description": "Revit category name (e.g. \"Windows\", \"Doors\")"},
                    "ifc_class": {"type": "string", "description": "IFC class to filter on (e.g. \"IfcWall\")"},
                    "parameter_name": {"type": "string", "description": "Parameter name to search for"},
                    "parameter_value": {"type": "string", "description": "Value to match (partial match for strings)"},
                    "max_results": {"type": "integer", "description": "Maximum number of elements to return", "default": 100}
                }
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: QueryIfcArgs = match parse_args("query_ifc_elements", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };
                ctx.info(format!("Querying IFC elements: {}", describe_filters(&args)));
                let payload = query_ifc_payload(&args);
                respond(client.post("/query_ifc_elements/", &payload, &ctx, None).await)
            }
        }),
    )?;

    let c = Arc::clone(client);
    registry.register(
        tool(
            "get_ifc_element_properties",
            "Get all properties from an element in a linked IFC model (instance and \
             type parameters). Use after query_ifc_elements.",
            json!({
                "type": "object",
                "properties": {
                    "link_instance_id": {"type": "integer", "description": "ID of the RevitLinkInstance (from query results)"},
                    "element_id": {"type": "integer", "description": "ID of the element within the linked model"}
                },
                "required": ["link_instance_id", "element_id"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: IfcPropertiesArgs =
                    match parse_args("get_ifc_element_properties", arguments) {
                        Ok(args) => args,
                        Err(result) => return result,
                    };
                ctx.info(format!(
                    "Getting properties for element {} in link {}",
                    args.element_id, args.link_instance_id
                ));
                let payload = json!({
                    "link_instance_id": args.link_instance_id,
                    "element_id": args.element_id,
                });
                respond(
                    client
                        .post("/get_ifc_element_properties/", &payload, &ctx, None)
                        .await,
                )
            }
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_are_sent_explicitly() {
        let args: QueryIfcArgs = serde_json::from_value(json!({})).unwrap();
        let payload = query_ifc_payload(&args);
        assert_eq!(payload["link_name"], "");
        assert_eq!(payload["category"], "");
        assert_eq!(payload["max_results"], 100);
    }

    #[test]
    fn filter_description_for_logging() {
        let args: QueryIfcArgs = serde_json::from_value(json!({})).unwrap();
        assert_eq!(describe_filters(&args), "all");

        let args: QueryIfcArgs = serde_json::from_value(json!({
            "category": "Doors",
            "parameter_name": "Mark"
        }))
        .unwrap();
        assert_eq!(describe_filters(&args), "category=Doors, Mark=*");
    }
}
