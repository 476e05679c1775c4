//! MCP (Model Context Protocol) server exposing the memory tools
//!
//! Communicates over stdio using JSON-RPC 2.0: one request per line on
//! stdin, one response per line on stdout. Diagnostics never touch stdout;
//! they go to the tracing sinks configured at startup.

pub mod catalog;
pub mod handlers;
pub mod protocol;
pub mod types;

use crate::error::Result;
use handlers::ToolRouter;
use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Run the MCP server loop until stdin closes.
///
/// The loop is async because tool calls await remote API responses; requests
/// are still handled one at a time, in arrival order.
pub async fn run_mcp_server(router: ToolRouter) -> Result<()> {
    tracing::info!("Starting MCP server (stdio mode)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
            Ok(request) => handle_request(request, &router).await,
            Err(e) => JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            ),
        };

        let payload = serde_json::to_string(&response)?;
        stdout.write_all(payload.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Handle a single JSON-RPC request
async fn handle_request(request: JsonRpcRequest, router: &ToolRouter) -> JsonRpcResponse {
    match request.method.as_str() {
        "initialize" => handlers::handle_initialize(request.id),
        "initialized" | "notifications/initialized" => {
            JsonRpcResponse::success(request.id, json!({}))
        }
        "tools/list" => handlers::handle_tools_list(request.id),
        "tools/call" => handlers::handle_tools_call(request.id, request.params, router).await,
        "resources/list" => handlers::handle_resources_list(request.id),
        "ping" => JsonRpcResponse::success(request.id, json!({})),

        _ => JsonRpcResponse::error(
            request.id,
            JsonRpcError::method_not_found(format!("Unknown method: {}", request.method)),
        ),
    }
}
