//! MCP server loop (stdio transport, line-delimited JSON-RPC).

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, mpsc};

use crate::context::{Context, LogEntry};
use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, LoggingMessageParams, RequestId,
    ServerCapabilities, ServerInfo, Tool,
};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Maximum request size (1MB).
/// Sized for large tool arguments (batch placements, code blocks).
pub const MAX_REQUEST_SIZE: usize = 1024 * 1024;

/// Dispatch surface the server exposes to the client.
///
/// The bridge's tool registry implements this. `call` must never panic and
/// never return a protocol-level failure for a backend error: backend errors
/// are reported as normalized text inside the result.
pub trait ToolRouter: Send + Sync + 'static {
    /// Tool descriptors for tools/list.
    fn tools(&self) -> Vec<Tool>;

    /// Execute a tool call.
    fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
        ctx: Context,
    ) -> impl Future<Output = CallToolResult> + Send;
}

/// An MCP server bound to a [`ToolRouter`].
pub struct Server<R> {
    router: Arc<R>,
    info: ServerInfo,
}

impl<R: ToolRouter> Server<R> {
    pub fn new(router: R, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            router: Arc::new(router),
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
        }
    }

    /// Serve over stdin/stdout until the client closes the stream.
    pub async fn serve_stdio(self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve over an arbitrary reader/writer pair.
    ///
    /// Requests are read one per line. `tools/call` requests are spawned as
    /// independent tasks so a slow backend call never blocks the read loop;
    /// responses are written in completion order.
    pub async fn serve<I, O>(self, mut reader: I, writer: O) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin + Send + 'static,
    {
        let writer = Arc::new(Mutex::new(writer));

        // Log notifications flow through a channel so tool tasks never
        // contend on the writer for best-effort messages.
        let (log_tx, log_rx) = mpsc::unbounded_channel();
        let log_pump = tokio::spawn(pump_logs(log_rx, Arc::clone(&writer)));

        loop {
            let mut line = String::new();
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                // EOF: client closed the stream.
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            if line.len() > MAX_REQUEST_SIZE {
                let err = Error::RequestTooLarge {
                    size: line.len(),
                    max: MAX_REQUEST_SIZE,
                };
                let response = JsonRpcResponse::failure(
                    None,
                    JsonRpcError::new(JsonRpcError::PARSE_ERROR, err.to_string()),
                );
                write_message(&writer, &response).await?;
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(e) => {
                    let response = JsonRpcResponse::failure(
                        None,
                        JsonRpcError::new(JsonRpcError::PARSE_ERROR, format!("parse error: {e}")),
                    );
                    write_message(&writer, &response).await?;
                    continue;
                }
            };

            // Notifications (initialized, cancelled, ...) receive no response.
            let Some(id) = request.id.clone() else {
                continue;
            };

            match request.method.as_str() {
                "initialize" => {
                    // Params are accepted but nothing in them changes behavior.
                    let _params: Option<InitializeParams> = request
                        .params
                        .and_then(|p| serde_json::from_value(p).ok());
                    let result = InitializeResult {
                        protocol_version: PROTOCOL_VERSION.to_string(),
                        capabilities: ServerCapabilities::default(),
                        server_info: self.info.clone(),
                    };
                    write_message(&writer, &JsonRpcResponse::success(id, result)).await?;
                }
                "ping" => {
                    write_message(&writer, &JsonRpcResponse::success(id, serde_json::json!({})))
                        .await?;
                }
                "tools/list" => {
                    let result = ListToolsResult {
                        tools: self.router.tools(),
                    };
                    write_message(&writer, &JsonRpcResponse::success(id, result)).await?;
                }
                "tools/call" => {
                    let params: CallToolParams = match request
                        .params
                        .ok_or(())
                        .and_then(|p| serde_json::from_value(p).map_err(|_| ()))
                    {
                        Ok(p) => p,
                        Err(()) => {
                            let response = JsonRpcResponse::failure(
                                Some(id),
                                JsonRpcError::new(
                                    JsonRpcError::INVALID_PARAMS,
                                    "invalid tools/call params",
                                ),
                            );
                            write_message(&writer, &response).await?;
                            continue;
                        }
                    };
                    self.spawn_call(id, params, Arc::clone(&writer), log_tx.clone());
                }
                other => {
                    let response = JsonRpcResponse::failure(
                        Some(id),
                        JsonRpcError::new(
                            JsonRpcError::METHOD_NOT_FOUND,
                            format!("method not found: {other}"),
                        ),
                    );
                    write_message(&writer, &response).await?;
                }
            }
        }

        drop(log_tx);
        let _ = log_pump.await;
        Ok(())
    }

    fn spawn_call<O>(
        &self,
        id: RequestId,
        params: CallToolParams,
        writer: Arc<Mutex<O>>,
        log_tx: mpsc::UnboundedSender<LogEntry>,
    ) where
        O: AsyncWrite + Unpin + Send + 'static,
    {
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            let ctx = Context::new(log_tx);
            let result: CallToolResult = router.call(&params.name, params.arguments, ctx).await;
            // The client may have disconnected while the call was in flight.
            let _ = write_message(&writer, &JsonRpcResponse::success(id, result)).await;
        });
    }
}

async fn pump_logs<O>(mut rx: mpsc::UnboundedReceiver<LogEntry>, writer: Arc<Mutex<O>>)
where
    O: AsyncWrite + Unpin,
{
    while let Some(entry) = rx.recv().await {
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "notifications/message",
            "params": LoggingMessageParams {
                level: entry.level,
                data: Value::String(entry.message),
            },
        });
        if write_message(&writer, &notification).await.is_err() {
            break;
        }
    }
}

async fn write_message<O>(writer: &Mutex<O>, message: &impl Serialize) -> Result<()>
where
    O: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(message)?;
    let mut writer = writer.lock().await;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
