//! MCP method handlers and the tool router
//!
//! The router is the single entry point per tool call: it decodes arguments,
//! resolves the effective user id, calls the injected [`MemoryStore`], and
//! renders the outcome as text. No failure past this point escapes as
//! anything but an error-flagged [`ToolCallResult`].

use serde_json::{json, Value};
use std::sync::Arc;

use super::catalog::tool_definitions;
use super::protocol::{
    InitializeResult, JsonRpcError, JsonRpcResponse, ServerCapabilities, ServerInfo,
    ToolCallResult, ToolsCapability,
};
use super::types::{
    AddMemoryParams, DeleteMemoryParams, SearchMemoriesParams, ToolRequest, UpdateMemoryParams,
};
use crate::config::DEFAULT_USER_ID;
use crate::mem0::types::MemoryHit;
use crate::mem0::MemoryStore;

/// Handle the initialize method
pub fn handle_initialize(id: Value) -> JsonRpcResponse {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability {
                list_changed: Some(false),
            },
        },
        server_info: ServerInfo {
            name: "memgate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

/// Handle the tools/list method
pub fn handle_tools_list(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "tools": tool_definitions() }))
}

/// Handle the resources/list method (no resources are exposed)
pub fn handle_resources_list(id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "resources": [] }))
}

/// Handle the tools/call method
pub async fn handle_tools_call(
    id: Value,
    params: Option<Value>,
    router: &ToolRouter,
) -> JsonRpcResponse {
    let params = match params {
        Some(p) => p,
        None => {
            return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
        }
    };

    let tool_name = match params.get("name").and_then(|v| v.as_str()) {
        Some(name) => name,
        None => {
            return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing tool name"));
        }
    };

    // Absence of arguments is meaningful to the router; don't default it
    // away, and treat an explicit null the same as a missing key
    let arguments = params
        .get("arguments")
        .cloned()
        .filter(|value| !value.is_null());
    let result = router.call(tool_name, arguments).await;

    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

/// Routes decoded tool calls to the memory store and formats outcomes.
///
/// Holds no mutable state: the store handle and the configured default user
/// id are set at construction and never change.
pub struct ToolRouter {
    store: Arc<dyn MemoryStore>,
    default_user_id: Option<String>,
}

impl ToolRouter {
    pub fn new(store: Arc<dyn MemoryStore>, default_user_id: Option<String>) -> Self {
        ToolRouter {
            store,
            default_user_id,
        }
    }

    /// Explicit caller value wins over the configured default, which wins
    /// over the fallback constant.
    fn resolve_user_id(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_string)
            .or_else(|| self.default_user_id.clone())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string())
    }

    /// Invoke a tool by name. Always resolves to a [`ToolCallResult`].
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        let Some(arguments) = arguments else {
            return ToolCallResult::error("Error: No arguments provided".to_string());
        };

        let request = match ToolRequest::decode(name, arguments) {
            Ok(request) => request,
            Err(message) => return ToolCallResult::error(message),
        };

        match request {
            ToolRequest::Add(params) => self.add(params).await,
            ToolRequest::Search(params) => self.search(params).await,
            ToolRequest::Update(params) => self.update(params).await,
            ToolRequest::Delete(params) => self.delete(params).await,
        }
    }

    async fn add(&self, params: AddMemoryParams) -> ToolCallResult {
        let user_id = self.resolve_user_id(params.user_id.as_deref());
        match self
            .store
            .add(&params.content, &user_id, params.metadata.as_ref())
            .await
        {
            Ok(id) => ToolCallResult::text(format!("Memory added successfully with ID: {}", id)),
            Err(e) => ToolCallResult::error(format!("Failed to add memory: {}", e)),
        }
    }

    async fn search(&self, params: SearchMemoriesParams) -> ToolCallResult {
        let user_id = self.resolve_user_id(params.user_id.as_deref());
        match self
            .store
            .search(
                &params.query,
                &user_id,
                params.filters.as_ref(),
                params.limit,
                params.sort,
            )
            .await
        {
            Ok(hits) => ToolCallResult::text(format_search_results(&hits)),
            Err(e) => ToolCallResult::error(format!("Failed to search memories: {}", e)),
        }
    }

    async fn update(&self, params: UpdateMemoryParams) -> ToolCallResult {
        let user_id = self.resolve_user_id(params.user_id.as_deref());
        match self
            .store
            .update(&params.memory_id, &user_id, &params.updates)
            .await
        {
            Ok(()) => {
                ToolCallResult::text(format!("Memory {} updated successfully", params.memory_id))
            }
            Err(e) => ToolCallResult::error(format!("Failed to update memory: {}", e)),
        }
    }

    async fn delete(&self, params: DeleteMemoryParams) -> ToolCallResult {
        // Confirmation gate comes first: no store call of any kind without it
        if !params.confirm {
            return ToolCallResult::error(
                "Deletion requires confirmation. Please set confirm: true to proceed.".to_string(),
            );
        }

        let user_id = self.resolve_user_id(params.user_id.as_deref());

        if let Some(memory_id) = &params.memory_id {
            return match self.store.delete(memory_id, &user_id).await {
                Ok(()) => {
                    ToolCallResult::text(format!("Memory {} deleted successfully", memory_id))
                }
                Err(e) => ToolCallResult::error(format!("Failed to delete memory: {}", e)),
            };
        }

        let Some(memory_ids) = params.memory_ids.as_deref().filter(|ids| !ids.is_empty()) else {
            return ToolCallResult::error(
                "Either memory_id or memory_ids must be provided".to_string(),
            );
        };

        match self.store.delete_many(memory_ids, &user_id).await {
            Ok(report) => {
                let mut text = format!("Deleted {} memories successfully", report.deleted_count);
                if report.all_succeeded() {
                    ToolCallResult::text(text)
                } else {
                    text.push_str(&format!("\nErrors: {}", report.errors.join("; ")));
                    ToolCallResult::error(text)
                }
            }
            Err(e) => ToolCallResult::error(format!("Failed to delete memories: {}", e)),
        }
    }
}

fn format_hit(hit: &MemoryHit) -> String {
    let mut lines = vec![
        format!("Memory: {}", hit.memory),
        format!("Relevance: {}", hit.score),
    ];
    if let Some(meta) = &hit.metadata {
        if let Some(category) = &meta.category {
            lines.push(format!("Category: {}", category));
        }
        if let Some(importance) = meta.importance {
            lines.push(format!("Importance: {}/10", importance));
        }
        if let Some(tags) = &meta.tags {
            if !tags.is_empty() {
                lines.push(format!("Tags: {}", tags.join(", ")));
            }
        }
        if let Some(source) = &meta.source {
            lines.push(format!("Source: {}", source));
        }
    }
    if let Some(id) = &hit.id {
        lines.push(format!("ID: {}", id));
    }
    lines.join("\n")
}

/// Render search hits as dash-separated text blocks
fn format_search_results(hits: &[MemoryHit]) -> String {
    if hits.is_empty() {
        return "No memories found".to_string();
    }
    hits.iter()
        .map(format_hit)
        .collect::<Vec<_>>()
        .join("\n---\n")
}
