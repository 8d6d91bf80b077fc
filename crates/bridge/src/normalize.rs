//! Response normalization.
//!
//! Every tool funnels its backend response through [`normalize`], which
//! collapses the backend's variable response shapes into one deterministic
//! string. The rules are order-sensitive and mutually exclusive; the first
//! match wins:
//!
//! 1. Non-object input is passed through (transport failure text).
//! 2. A `data` envelope with at most one sibling key is unwrapped.
//! 3. An `error` key produces the fixed error report (wins over everything).
//! 4. An `output` key is returned verbatim (code execution results).
//! 5. `status: active` + `health: healthy` produce the status report.
//! 6. Anything else is pretty-printed as JSON.

use serde_json::{Map, Value};

const ERROR_HEADER: &str = "=== ERROR ===";
const TRACEBACK_HEADER: &str = "=== TRACEBACK ===";
const STATUS_HEADER: &str = "=== REVIT STATUS ===";
const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Convert a backend response into the single string returned to the agent.
pub fn normalize(response: &Value) -> String {
    let object = match response {
        Value::Object(object) => object,
        // Plain strings carry transport failure text; return unchanged.
        Value::String(text) => return text.clone(),
        // Bare numbers/bools/nulls/arrays are undefined upstream; render
        // their JSON form rather than failing.
        other => return other.to_string(),
    };

    // Unwrap a transport envelope: a `data` object with at most one sibling
    // metadata key. Anything richer is a real domain object.
    let object = match object.get("data") {
        Some(Value::Object(inner)) if object.len() <= 2 => inner,
        _ => object,
    };

    if let Some(error) = object.get("error") {
        return format_error(error, object.get("traceback"));
    }

    if let Some(output) = object.get("output") {
        return match output {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
    }

    if is_healthy_status(object) {
        return format_status(object);
    }

    // Data-rich responses (selection info, counts, element inspection, ...)
    // keep their full structure. serde_json leaves non-ASCII intact.
    serde_json::to_string_pretty(object).unwrap_or_else(|_| Value::Object(object.clone()).to_string())
}

fn format_error(error: &Value, traceback: Option<&Value>) -> String {
    let message = match error {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::String(_) | Value::Null => UNKNOWN_ERROR.to_string(),
        other => other.to_string(),
    };

    let mut parts = vec![ERROR_HEADER.to_string()];
    parts.push(format!("Error: {message}"));

    if let Some(Value::String(traceback)) = traceback
        && !traceback.is_empty()
    {
        parts.push(format!("\n{TRACEBACK_HEADER}"));
        parts.push(traceback.clone());
    }

    parts.join("\n")
}

fn is_healthy_status(object: &Map<String, Value>) -> bool {
    let field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase()
    };
    field("status") == "active" && field("health") == "healthy"
}

fn format_status(object: &Map<String, Value>) -> String {
    let field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
    };

    let mut parts = vec![STATUS_HEADER.to_string()];
    parts.push(format!("Status: {}", field("status")));
    parts.push(format!("Health: {}", field("health")));
    if let Some(api_name) = object.get("api_name").and_then(Value::as_str) {
        parts.push(format!("API: {api_name}"));
    }
    if let Some(title) = object.get("document_title").and_then(Value::as_str) {
        parts.push(format!("Document: {title}"));
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_string_passes_through_unchanged() {
        let response = Value::String("Connection refused".to_string());
        assert_eq!(normalize(&response), "Connection refused");
    }

    #[test]
    fn non_object_non_string_is_stringified() {
        assert_eq!(normalize(&json!(5)), "5");
        assert_eq!(normalize(&json!(null)), "null");
        assert_eq!(normalize(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn error_report_two_lines() {
        let response = json!({"error": "Element not found"});
        assert_eq!(
            normalize(&response),
            "=== ERROR ===\nError: Element not found"
        );
    }

    #[test]
    fn error_report_includes_traceback_verbatim() {
        let response = json!({
            "error": "boom",
            "traceback": "Traceback (most recent call last):\n  line 1"
        });
        let text = normalize(&response);
        assert!(text.starts_with("=== ERROR ===\nError: boom"));
        assert!(text.contains("\n=== TRACEBACK ===\n"));
        assert!(text.ends_with("Traceback (most recent call last):\n  line 1"));
    }

    #[test]
    fn empty_traceback_is_omitted() {
        let response = json!({"error": "boom", "traceback": ""});
        assert_eq!(normalize(&response), "=== ERROR ===\nError: boom");
    }

    #[test]
    fn empty_error_message_gets_default() {
        let response = json!({"error": ""});
        assert_eq!(
            normalize(&response),
            "=== ERROR ===\nError: Unknown error occurred"
        );
        let response = json!({"error": null});
        assert_eq!(
            normalize(&response),
            "=== ERROR ===\nError: Unknown error occurred"
        );
    }

    #[test]
    fn error_wins_over_output_and_status() {
        let response = json!({
            "error": "failed",
            "output": "should not appear",
            "status": "Active",
            "health": "Healthy"
        });
        let text = normalize(&response);
        assert!(text.starts_with("=== ERROR ==="));
        assert!(!text.contains("should not appear"));
    }

    #[test]
    fn output_is_returned_verbatim() {
        let output = "Document title: Test\nNumber of walls: 12";
        let response = json!({"output": output, "status": "done"});
        assert_eq!(normalize(&response), output);
    }

    #[test]
    fn output_preserves_whitespace_and_non_ascii() {
        let output = "  mesure: 12 m²\n\tçà été fait\n";
        let response = json!({"output": output});
        assert_eq!(normalize(&response), output);
    }

    #[test]
    fn status_report_without_document_title() {
        let response = json!({"status": "Active", "health": "Healthy", "api_name": "RevitAPI"});
        assert_eq!(
            normalize(&response),
            "=== REVIT STATUS ===\nStatus: Active\nHealth: Healthy\nAPI: RevitAPI"
        );
    }

    #[test]
    fn status_report_full() {
        let response = json!({
            "status": "ACTIVE",
            "health": "healthy",
            "api_name": "RevitAPI",
            "document_title": "Project1.rvt",
            "uptime": 42
        });
        // Casing is preserved, comparison is case-insensitive, and no other
        // domain fields leak into the formatted report.
        assert_eq!(
            normalize(&response),
            "=== REVIT STATUS ===\nStatus: ACTIVE\nHealth: healthy\nAPI: RevitAPI\nDocument: Project1.rvt"
        );
    }

    #[test]
    fn unhealthy_status_falls_back_to_json() {
        let response = json!({"status": "Active", "health": "Degraded"});
        let text = normalize(&response);
        assert!(text.starts_with('{'));
        assert!(text.contains("\"health\": \"Degraded\""));
    }

    #[test]
    fn data_envelope_is_unwrapped() {
        let response = json!({"data": {"count": 5}, "request_id": "abc"});
        let text = normalize(&response);
        assert!(text.contains("\"count\": 5"));
        assert!(!text.contains("request_id"));
    }

    #[test]
    fn envelope_transparency_matches_direct_normalization() {
        let inner = json!({"error": "nope", "traceback": "tb"});
        let wrapped = json!({"data": inner, "meta": 1});
        assert_eq!(normalize(&wrapped), normalize(&inner));
    }

    #[test]
    fn data_with_two_siblings_is_not_unwrapped() {
        let response = json!({"data": {"count": 5}, "request_id": "abc", "page": 1});
        let text = normalize(&response);
        assert!(text.contains("request_id"));
        assert!(text.contains("\"data\""));
    }

    #[test]
    fn non_object_data_is_not_unwrapped() {
        let response = json!({"data": [1, 2, 3]});
        let text = normalize(&response);
        assert!(text.contains("\"data\""));
    }

    #[test]
    fn fallback_round_trips() {
        let response = json!({
            "count": 5,
            "elements": [{"id": 1, "name": "Wand ø30"}],
            "filters": {"category": "Walls"}
        });
        let text = normalize(&response);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn fallback_keeps_non_ascii_intact() {
        let response = json!({"name": "Fenêtre — 90×120"});
        assert!(normalize(&response).contains("Fenêtre — 90×120"));
    }
}
