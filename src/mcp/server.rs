//! MCP server with stdio transport
//!
//! Implements JSON-RPC 2.0 message handling shared by every transport, and
//! the newline-delimited stdin/stdout loop. The HTTP `/rpc` and SSE
//! transports call [`McpServer::handle_message`] directly.

use super::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult, JSONRPC_VERSION,
    PROTOCOL_VERSION,
};
use super::tools::ToolHandler;
use crate::error::{Result, TablebookError};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// Written when a response cannot be serialized
const FALLBACK_ERROR: &str =
    r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Serialization error"},"id":null}"#;

/// MCP server that handles JSON-RPC requests
pub struct McpServer {
    tool_handler: ToolHandler,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tool_handler: ToolHandler) -> Self {
        Self { tool_handler }
    }

    pub fn tool_handler(&self) -> &ToolHandler {
        &self.tool_handler
    }

    /// Serve stdin/stdout until EOF
    pub async fn run(&self) -> Result<()> {
        info!("MCP server started, listening on stdin...");
        self.run_with(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC over any reader/writer pair
    pub async fn run_with<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("Received EOF, shutting down");
                    break;
                }
                Ok(_) => {
                    let message = line.trim();
                    if message.is_empty() {
                        continue;
                    }

                    debug!("Received request: {}", message);

                    let Some(response) = self.handle_message(message).await else {
                        continue;
                    };

                    let response_json = serde_json::to_string(&response).unwrap_or_else(|e| {
                        error!("Failed to serialize response: {}", e);
                        FALLBACK_ERROR.to_string()
                    });

                    debug!("Sending response: {}", response_json);

                    if let Err(e) = writer.write_all(response_json.as_bytes()).await {
                        error!("Failed to write response: {}", e);
                        return Err(e.into());
                    }
                    if let Err(e) = writer.write_all(b"\n").await {
                        error!("Failed to write newline: {}", e);
                        return Err(e.into());
                    }
                    if let Err(e) = writer.flush().await {
                        error!("Failed to flush output: {}", e);
                        return Err(e.into());
                    }
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    return Err(e.into());
                }
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle one raw message; `None` for notifications
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
                ));
            }
        };

        let id = value.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
            )),
        }
    }

    /// Handle one decoded request; `None` for notifications
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => {
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method))
            }
        };
        Some(response)
    }

    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling initialize");

        JsonRpcResponse::success(
            request.id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": "tablebook",
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": {}
                }
            }),
        )
    }

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Handling tools/list");

        JsonRpcResponse::success(
            request.id,
            json!({
                "tools": self.tool_handler.list_tools()
            }),
        )
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params = match request.params.as_object() {
            Some(obj) => obj,
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("params must be an object"),
                );
            }
        };

        let tool_name = match params.get("name").and_then(|v| v.as_str()) {
            Some(name) => name,
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("missing 'name' field"),
                );
            }
        };

        debug!("Handling tools/call: {}", tool_name);

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let result = match self.tool_handler.execute(tool_name, arguments).await {
            Ok(reply) => ToolCallResult::text(reply.text),
            Err(TablebookError::UnknownTool(name)) => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params(format!("Unknown tool: {}", name)),
                );
            }
            Err(e) if e.is_expected() => {
                ToolCallResult::error_text(self.tool_handler.describe_error(&e))
            }
            Err(e) => {
                warn!("Tool {} failed: {}", tool_name, e);
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::internal_error(format!("Tool execution failed: {}", e)),
                );
            }
        };

        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::error(
                request.id,
                JsonRpcError::internal_error(format!("Serialization error: {}", e)),
            ),
        }
    }
}
