//! Code execution tool.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use super::{handler, parse_args, respond, tool};
use crate::client::RevitClient;
use crate::error::Result;
use crate::registry::Registry;

const EXECUTE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ExecuteCodeArgs {
    code: String,
    #[serde(default = "default_description")]
    description: String,
    #[serde(default = "default_true")]
    use_transaction: bool,
}

fn default_description() -> String {
    "Code execution".to_string()
}

fn default_true() -> bool {
    true
}

fn execute_code_payload(args: &ExecuteCodeArgs) -> Value {
    json!({
        "code": args.code,
        "description": args.description,
        "use_transaction": args.use_transaction,
    })
}

pub fn register(registry: &mut Registry, client: &Arc<RevitClient>) -> Result<()> {
    let c = Arc::clone(client);
    registry.register(
        tool(
            "execute_revit_code",
            "Execute IronPython code directly in the Revit context. The code has access \
             to `doc` (the active document), `DB` (the Revit API database namespace), and \
             `print` (output is returned in the response). Set use_transaction to false \
             for read-only operations.",
            json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "The IronPython code to execute"
                    },
                    "description": {
                        "type": "string",
                        "description": "Optional description of what the code does",
                        "default": "Code execution"
                    },
                    "use_transaction": {
                        "type": "boolean",
                        "description": "Wrap the code in a Revit transaction (required when modifying the model)",
                        "default": true
                    }
                },
                "required": ["code"]
            }),
        ),
        handler(move |arguments, ctx| {
            let client = Arc::clone(&c);
            async move {
                let args: ExecuteCodeArgs = match parse_args("execute_revit_code", arguments) {
                    Ok(args) => args,
                    Err(result) => return result,
                };

                let trans_info = if args.use_transaction {
                    "with transaction"
                } else {
                    "without transaction"
                };
                ctx.info(format!("Executing code ({}): {}", trans_info, args.description));

                let payload = execute_code_payload(&args);
                respond(
                    client
                        .post("/execute_code/", &payload, &ctx, Some(EXECUTE_TIMEOUT))
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
    fn payload_carries_defaults() {
        let args: ExecuteCodeArgs =
            serde_json::from_value(json!({"code": "print(doc.Title)"})).unwrap();
        let payload = execute_code_payload(&args);
        assert_eq!(payload["code"], "print(doc.Title)");
        assert_eq!(payload["description"], "Code execution");
        assert_eq!(payload["use_transaction"], true);
    }

    #[test]
    fn transaction_can_be_disabled() {
        let args: ExecuteCodeArgs = serde_json::from_value(json!({
            "code": "pass",
            "description": "Count walls",
            "use_transaction": false
        }))
        .unwrap();
        let payload = execute_code_payload(&args);
        assert_eq!(payload["use_transaction"], false);
        assert_eq!(payload["description"], "Count walls");
    }
}
