//! Typed tool-call arguments
//!
//! Each tool gets its own argument record, decoded exactly once at the
//! dispatch boundary; past this point no handler touches raw JSON.

use crate::mem0::types::{MemoryMetadata, MemoryUpdates, SearchFilters, SortOrder};
use crate::mem0::DEFAULT_SEARCH_LIMIT;
use serde::Deserialize;
use serde_json::Value;

/// Arguments for add_memory
#[derive(Debug, Clone, Deserialize)]
pub struct AddMemoryParams {
    pub content: String,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<MemoryMetadata>,
}

/// Arguments for search_memories
#[derive(Debug, Clone, Deserialize)]
pub struct SearchMemoriesParams {
    pub query: String,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub sort: SortOrder,
}

fn default_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

/// Arguments for update_memory
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemoryParams {
    pub memory_id: String,
    pub updates: MemoryUpdates,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

/// Arguments for delete_memory. Carries either one id or a batch; which one
/// (and whether either is present at all) is the router's decision.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteMemoryParams {
    #[serde(default)]
    pub memory_id: Option<String>,
    #[serde(default)]
    pub memory_ids: Option<Vec<String>>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

/// One decoded tool invocation
#[derive(Debug, Clone)]
pub enum ToolRequest {
    Add(AddMemoryParams),
    Search(SearchMemoriesParams),
    Update(UpdateMemoryParams),
    Delete(DeleteMemoryParams),
}

impl ToolRequest {
    /// Decode the arguments for a named tool. The error string is already
    /// caller-facing; unknown names are echoed back verbatim.
    pub fn decode(name: &str, arguments: Value) -> Result<Self, String> {
        let invalid = |e: serde_json::Error| format!("Invalid parameters: {}", e);
        match name {
            "add_memory" => serde_json::from_value(arguments)
                .map(ToolRequest::Add)
                .map_err(invalid),
            "search_memories" => serde_json::from_value(arguments)
                .map(ToolRequest::Search)
                .map_err(invalid),
            "update_memory" => serde_json::from_value(arguments)
                .map(ToolRequest::Update)
                .map_err(invalid),
            "delete_memory" => serde_json::from_value(arguments)
                .map(ToolRequest::Delete)
                .map_err(invalid),
            other => Err(format!("Unknown tool: {}", other)),
        }
    }
}
