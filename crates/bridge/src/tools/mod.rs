//! Tool definitions, one module per backend area.
//!
//! Each module registers its tools against the shared [`Registry`]. The
//! handlers are mechanical: parse typed arguments, build the request payload,
//! log through the context, call the bound transport verb, normalize.

mod code;
mod family;
mod ifc;
mod modification;
mod parameter;
mod selection;
mod status;
mod views;

use std::future::Future;
use std::sync::Arc;

use mcp::{CallToolResult, Context, Tool};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::{ClientError, RevitClient};
use crate::error::Result;
use crate::normalize::normalize;
use crate::registry::{Handler, Registry};

/// Compose the full tool catalog. Called once at startup; a duplicate tool
/// name anywhere in the modules is a fatal error.
pub fn build_registry(client: Arc<RevitClient>) -> Result<Registry> {
    let mut registry = Registry::new();
    status::register(&mut registry, &client)?;
    views::register(&mut registry, &client)?;
    code::register(&mut registry, &client)?;
    family::register(&mut registry, &client)?;
    selection::register(&mut registry, &client)?;
    parameter::register(&mut registry, &client)?;
    ifc::register(&mut registry, &client)?;
    modification::register(&mut registry, &client)?;
    Ok(registry)
}

fn tool(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Option<Value>, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallToolResult> + Send + 'static,
{
    Box::new(move |arguments, ctx| Box::pin(f(arguments, ctx)))
}

/// Deserialize the arguments object into the tool's typed args.
///
/// A missing arguments object means "all defaults". A failed parse is a
/// tool-level error result, never a crash.
fn parse_args<T: DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> std::result::Result<T, CallToolResult> {
    let arguments = arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    serde_json::from_value(arguments).map_err(|e| {
        CallToolResult::text(format!("Invalid arguments for {tool_name}: {e}"))
    })
}

/// Normalize a transport outcome into the tool's text result.
fn respond(outcome: std::result::Result<Value, ClientError>) -> CallToolResult {
    match outcome {
        Ok(response) => CallToolResult::text(normalize(&response)),
        Err(e) => CallToolResult::text(format!("Error communicating with Revit: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn catalog_is_complete_and_unique() {
        let client = Arc::new(RevitClient::new("http://localhost:48884/revit_mcp_api"));
        let registry = build_registry(client).unwrap();

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names.len(), registry.len());
        for expected in [
            "get_revit_status",
            "get_revit_model_info",
            "get_current_view_info",
            "get_current_view_elements",
            "export_current_view",
            "execute_revit_code",
            "place_family",
            "place_workplane_families",
            "list_families",
            "list_family_categories",
            "get_active_selection",
            "inspect_selected_element",
            "inspect_element",
            "get_link_status",
            "quick_count",
            "get_element_parameter",
            "set_element_parameter",
            "get_all_parameters",
            "set_parameters_bulk",
            "set_parameters_multi_elements",
            "query_ifc_elements",
            "get_ifc_element_properties",
            "batch_update",
            "create_sheet",
            "place_view_on_sheet",
            "create_walls_at_lines",
            "batch_family_placement",
            "place_workplane_windows",
            "coordinate_converter",
        ] {
            assert!(names.contains(&expected), "missing tool: {expected}");
        }
        assert_eq!(registry.len(), 29);
    }

    #[test]
    fn transport_failure_is_rendered_as_text() {
        let result = respond(Err(ClientError::Status {
            status: 500,
            body: "worker crashed".to_string(),
        }));
        assert_eq!(
            result.content[0].as_text(),
            Some("Error communicating with Revit: backend returned HTTP 500: worker crashed")
        );
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn unreachable_backend_yields_text_not_protocol_error() {
        use mcp::ToolRouter;

        // Port 1 refuses connections; the call must still resolve to a
        // descriptive text result instead of surfacing a transport error.
        let client = Arc::new(RevitClient::new("http://127.0.0.1:1"));
        let registry = build_registry(client).unwrap();

        let result = registry
            .call("get_revit_status", None, Context::detached())
            .await;
        let text = result.content[0].as_text().unwrap();
        assert!(
            text.starts_with("Error communicating with Revit:"),
            "unexpected result: {text}"
        );
        assert!(!result.is_error);
    }

    #[derive(Debug, Deserialize)]
    struct DemoArgs {
        element_id: i64,
        #[serde(default)]
        limit: Option<i64>,
    }

    #[test]
    fn parse_args_reports_missing_required_fields() {
        let err = parse_args::<DemoArgs>("demo", Some(serde_json::json!({"limit": 3})))
            .unwrap_err();
        let text = err.content[0].as_text().unwrap();
        assert!(text.starts_with("Invalid arguments for demo:"));
    }

    #[test]
    fn parse_args_defaults_when_arguments_absent() {
        let args: std::result::Result<DemoArgs, _> = parse_args("demo", None);
        assert!(args.is_err()); // element_id is required

        #[derive(Debug, Deserialize, Default)]
        struct NoArgs {}
        let parsed: NoArgs = parse_args("demo", None).unwrap();
        let _ = parsed;
    }
}
