//! Static tool catalog advertised via tools/list

use super::protocol::ToolDefinition;
use serde_json::json;

fn metadata_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "category": {
                "type": "string",
                "description": "Free-form grouping, e.g. 'work' or 'personal'"
            },
            "importance": {
                "type": "integer",
                "minimum": 1,
                "maximum": 10,
                "description": "How important this memory is, 1 (low) to 10 (high)"
            },
            "tags": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Labels for later filtering"
            },
            "source": {
                "type": "string",
                "description": "Where this memory came from"
            }
        },
        "additionalProperties": false
    })
}

/// The four memory tools, in their fixed advertised order
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "add_memory".to_string(),
            description: "Store a new memory for a user. Use this to remember facts, \
                          preferences, and decisions worth recalling in later sessions."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "The information to remember"
                    },
                    "userId": {
                        "type": "string",
                        "description": "User the memory belongs to (defaults to the configured user)"
                    },
                    "metadata": metadata_schema()
                },
                "required": ["content"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "search_memories".to_string(),
            description: "Search stored memories with optional filters on category, tags, \
                          minimum importance, and creation date range."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to look for"
                    },
                    "userId": {
                        "type": "string",
                        "description": "User whose memories to search (defaults to the configured user)"
                    },
                    "filters": {
                        "type": "object",
                        "properties": {
                            "category": { "type": "string" },
                            "tags": {
                                "type": "array",
                                "items": { "type": "string" }
                            },
                            "importance_min": {
                                "type": "integer",
                                "minimum": 1,
                                "maximum": 10
                            },
                            "date_range": {
                                "type": "object",
                                "properties": {
                                    "start": { "type": "string", "format": "date-time" },
                                    "end": { "type": "string", "format": "date-time" }
                                },
                                "required": ["start", "end"]
                            }
                        }
                    },
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 100,
                        "default": 10,
                        "description": "Maximum number of results"
                    },
                    "sort": {
                        "type": "string",
                        "enum": ["relevance", "date", "importance"],
                        "default": "relevance"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "update_memory".to_string(),
            description: "Update an existing memory's content and/or metadata by id. Fields \
                          left out of updates are left unchanged."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "memory_id": {
                        "type": "string",
                        "description": "Id of the memory to update"
                    },
                    "updates": {
                        "type": "object",
                        "properties": {
                            "content": { "type": "string" },
                            "metadata": metadata_schema()
                        }
                    },
                    "userId": {
                        "type": "string",
                        "description": "User the memory belongs to (defaults to the configured user)"
                    }
                },
                "required": ["memory_id", "updates"]
            }),
        },
        ToolDefinition {
            name: "delete_memory".to_string(),
            description: "Permanently delete one memory (memory_id) or several (memory_ids). \
                          Requires confirm: true. Bulk deletion is not atomic: ids removed \
                          before a failure stay removed."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "memory_id": {
                        "type": "string",
                        "description": "Id of a single memory to delete"
                    },
                    "memory_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 1,
                        "description": "Ids to delete in one call, processed one at a time"
                    },
                    "userId": {
                        "type": "string",
                        "description": "User the memories belong to (defaults to the configured user)"
                    },
                    "confirm": {
                        "type": "boolean",
                        "default": false,
                        "description": "Must be true for any deletion to proceed"
                    }
                }
            }),
        },
    ]
}
