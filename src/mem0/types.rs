//! Request and result shapes shared between the tool router and the Mem0 client

use serde::{Deserialize, Serialize};

/// Metadata attached to a memory record.
///
/// Serialized both outbound (as the metadata bag on add/update) and inbound
/// (from search hits), so absent fields must stay absent rather than null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Importance on a 1-10 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Caller-supplied search filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Lower bound on importance, 1-10
    #[serde(default)]
    pub importance_min: Option<u8>,

    #[serde(default)]
    pub date_range: Option<DateRange>,
}

/// Inclusive creation-date window, both bounds ISO-8601
#[derive(Debug, Clone, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Search result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Vendor relevance order, passed through unchanged
    #[default]
    Relevance,
    /// Vendor date order, passed through unchanged
    Date,
    /// Client-side descending re-sort by metadata importance
    Importance,
}

/// Patch applied to an existing memory. Absent fields are omitted from the
/// outbound payload, never sent as null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryUpdates {
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub metadata: Option<MemoryMetadata>,
}

/// One memory as returned by a search call. The vendor owns these records;
/// this shape only exists to render them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryHit {
    #[serde(default)]
    pub id: Option<String>,

    /// The memory text itself
    #[serde(default)]
    pub memory: String,

    /// Vendor relevance score
    #[serde(default)]
    pub score: f64,

    #[serde(default)]
    pub metadata: Option<MemoryMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl MemoryHit {
    /// Importance used for client-side sorting; missing metadata counts as 0
    pub fn importance(&self) -> u8 {
        self.metadata
            .as_ref()
            .and_then(|m| m.importance)
            .unwrap_or(0)
    }
}

/// Accounting for a bulk delete. There is no rollback: ids deleted before a
/// failure stay deleted, and the caller sees the mixed outcome itemized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkDeleteReport {
    pub deleted_count: usize,
    pub errors: Vec<String>,
}

impl BulkDeleteReport {
    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}
