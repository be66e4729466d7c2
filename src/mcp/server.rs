//! MCP transport adapter: newline-delimited JSON-RPC 2.0 over any byte
//! stream.
//!
//! One request frame in, one response frame out, strictly in order; the
//! next frame is not read until the previous response has been written.
//! Notifications (frames without an id) are consumed without a response.
//! A frame that is not valid JSON gets a parse-error response with a null
//! id, after which the connection ends: framing can no longer be trusted.
//!
//! Tool-level failures are *results*, not protocol errors: a failed tool
//! call comes back as a JSON-RPC `result` with `isError: true`, so the
//! error taxonomy survives the transport intact.

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::registry::ToolRegistry;
use super::types::{ToolRequest, ToolResult};

/// MCP protocol revision implemented by this server.
const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// One incoming JSON-RPC frame. A missing id marks a notification.
#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// The MCP server: a registry plus a serve loop over a byte stream.
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Serve newline-delimited JSON-RPC frames until the reader ends or a
    /// parse error poisons the framing.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request: RpcRequest = match serde_json::from_str(line) {
                Ok(request) => request,
                Err(e) => {
                    error!("unparseable frame, closing connection: {e}");
                    let frame = error_frame(Value::Null, PARSE_ERROR, &format!("parse error: {e}"));
                    write_frame(&mut writer, &frame).await?;
                    return Ok(());
                }
            };

            let Some(id) = request.id else {
                debug!("notification '{}' consumed", request.method);
                continue;
            };

            let frame = match self.handle(&request.method, request.params).await {
                Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
                Err((code, message)) => error_frame(id, code, &message),
            };
            write_frame(&mut writer, &frame).await?;
        }
        info!("input stream ended, shutting down");
        Ok(())
    }

    /// Route one method call. `Err` becomes a JSON-RPC error frame.
    async fn handle(&self, method: &str, params: Value) -> Result<Value, (i64, String)> {
        match method {
            "initialize" => {
                info!("initialize received");
                Ok(json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                    "capabilities": {
                        "tools": {},
                    },
                }))
            }
            "ping" => Ok(json!({})),
            "tools/list" => {
                let tools: Vec<Value> = self
                    .registry
                    .descriptors()
                    .map(|descriptor| descriptor.to_listing())
                    .collect();
                Ok(json!({"tools": tools}))
            }
            "tools/call" => {
                let request: ToolRequest = serde_json::from_value(params)
                    .map_err(|e| (INVALID_PARAMS, format!("invalid tools/call params: {e}")))?;
                let result = self.registry.dispatch(request).await;
                Ok(call_tool_result(result))
            }
            other => Err((METHOD_NOT_FOUND, format!("method '{other}' not found"))),
        }
    }
}

/// Render a dispatch outcome as an MCP CallToolResult.
fn call_tool_result(result: ToolResult) -> Value {
    match result {
        ToolResult::Success { payload } => {
            let text = payload.to_string();
            json!({
                "content": [{"type": "text", "text": text}],
                "structuredContent": payload,
                "isError": false,
            })
        }
        ToolResult::Failure { kind, message } => json!({
            "content": [{"type": "text", "text": message}],
            "structuredContent": {"kind": kind, "message": message},
            "isError": true,
        }),
    }
}

fn error_frame(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message},
    })
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &Value) -> std::io::Result<()> {
    let mut bytes = serde_json::to_vec(frame)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await
}
