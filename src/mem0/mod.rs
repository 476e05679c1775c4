//! Remote API adapter for the hosted Mem0 memory service
//!
//! All vendor-specific request and response shaping lives here, behind the
//! [`MemoryStore`] trait so the tool router can be tested against a fake.
//! Every operation returns a local result; vendor failures never escape as
//! anything but a [`MemgateError`].

pub mod types;

use crate::config::Mem0Config;
use crate::error::{MemgateError, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{json, Map, Value};
use types::{BulkDeleteReport, MemoryHit, MemoryMetadata, MemoryUpdates, SearchFilters, SortOrder};

/// Hard cap on search result count enforced client-side
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Result count used when the caller does not ask for one
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Fixed system framing sent ahead of the user content on every add
const ADD_FRAMING: &str = "Store the following information as a long-term memory for the user.";

/// Storage operations the tool router depends on.
///
/// `user_id` scopes every call to one end user; the router resolves it before
/// calling in, so implementations can rely on it being non-empty.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store new content, returning the id the service assigned
    async fn add(
        &self,
        content: &str,
        user_id: &str,
        metadata: Option<&MemoryMetadata>,
    ) -> Result<String>;

    /// Search the user's memories, already limited and sorted per the options
    async fn search(
        &self,
        query: &str,
        user_id: &str,
        filters: Option<&SearchFilters>,
        limit: u32,
        sort: SortOrder,
    ) -> Result<Vec<MemoryHit>>;

    /// Patch an existing memory's content and/or metadata
    async fn update(&self, memory_id: &str, user_id: &str, updates: &MemoryUpdates) -> Result<()>;

    /// Delete a single memory
    async fn delete(&self, memory_id: &str, user_id: &str) -> Result<()>;

    /// Delete several memories one at a time, collecting per-item failures.
    ///
    /// Sequential on purpose: deterministic error attribution, and no burst
    /// load on the remote service. An empty id list makes no remote call.
    /// There is no rollback; items deleted before a failure stay deleted.
    async fn delete_many(&self, memory_ids: &[String], user_id: &str) -> Result<BulkDeleteReport> {
        let mut report = BulkDeleteReport::default();
        for id in memory_ids {
            match self.delete(id, user_id).await {
                Ok(()) => report.deleted_count += 1,
                Err(e) => report.errors.push(format!("Failed to delete {}: {}", id, e)),
            }
        }
        Ok(report)
    }
}

/// HTTP client for the hosted Mem0 API
pub struct Mem0Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Mem0Client {
    /// Build a client from configuration.
    ///
    /// Fails when no API key is configured; this is the one fatal,
    /// non-retryable startup error in the system.
    pub fn new(config: &Mem0Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                MemgateError::Config(
                    "Mem0 API key is not set (mem0.api_key in config or MEM0_API_KEY)".to_string(),
                )
            })?;

        Ok(Mem0Client {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(
            reqwest::header::AUTHORIZATION,
            format!("Token {}", self.api_key),
        )
    }

    /// Turn a vendor response into JSON, mapping non-success statuses to
    /// [`MemgateError::Api`]. Empty bodies (delete, update) become `Null`.
    async fn into_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MemgateError::Api(format!("{}: {}", status, body.trim())));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MemoryStore for Mem0Client {
    async fn add(
        &self,
        content: &str,
        user_id: &str,
        metadata: Option<&MemoryMetadata>,
    ) -> Result<String> {
        let mut body = build_add_options(user_id, metadata)?;
        body.insert(
            "messages".to_string(),
            json!([
                { "role": "system", "content": ADD_FRAMING },
                { "role": "user", "content": content },
            ]),
        );

        tracing::debug!(user_id, "adding memory");
        let response = self
            .authed(self.http.post(format!("{}/v1/memories/", self.base_url)))
            .json(&Value::Object(body))
            .send()
            .await?;
        let payload = Self::into_json(response).await?;
        Ok(extract_memory_id(&payload))
    }

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        filters: Option<&SearchFilters>,
        limit: u32,
        sort: SortOrder,
    ) -> Result<Vec<MemoryHit>> {
        let mut body = Map::new();
        body.insert("query".to_string(), json!(query));
        body.insert("user_id".to_string(), json!(user_id));
        body.insert("limit".to_string(), json!(effective_limit(limit)));
        if let Some(vendor_filters) = build_search_filters(filters)? {
            body.insert("filters".to_string(), Value::Object(vendor_filters));
        }

        tracing::debug!(user_id, query, "searching memories");
        let response = self
            .authed(
                self.http
                    .post(format!("{}/v2/memories/search/", self.base_url)),
            )
            .json(&Value::Object(body))
            .send()
            .await?;
        let payload = Self::into_json(response).await?;

        let mut hits = extract_hits(payload);
        apply_sort(sort, &mut hits);
        Ok(hits)
    }

    async fn update(&self, memory_id: &str, _user_id: &str, updates: &MemoryUpdates) -> Result<()> {
        let mut body = Map::new();
        if let Some(content) = &updates.content {
            body.insert("text".to_string(), json!(content));
        }
        if let Some(metadata) = &updates.metadata {
            body.insert("metadata".to_string(), serde_json::to_value(metadata)?);
        }

        tracing::debug!(memory_id, "updating memory");
        let response = self
            .authed(
                self.http
                    .put(format!("{}/v1/memories/{}/", self.base_url, memory_id)),
            )
            .json(&Value::Object(body))
            .send()
            .await?;
        Self::into_json(response).await?;
        Ok(())
    }

    // user_id is accepted for parity with the other operations; the vendor
    // delete endpoint is keyed by memory id alone, with isolation enforced
    // server-side by the credential. Known asymmetry, kept as-is.
    async fn delete(&self, memory_id: &str, _user_id: &str) -> Result<()> {
        tracing::debug!(memory_id, "deleting memory");
        let response = self
            .authed(
                self.http
                    .delete(format!("{}/v1/memories/{}/", self.base_url, memory_id)),
            )
            .send()
            .await?;
        Self::into_json(response).await?;
        Ok(())
    }
}

/// Clamp a requested search limit to the service maximum. The schema owns
/// the lower bound; only the ceiling is enforced here.
fn effective_limit(limit: u32) -> u32 {
    limit.min(MAX_SEARCH_LIMIT)
}

/// Build the options object for an add call. When no metadata is given, no
/// metadata-derived keys appear at all.
fn build_add_options(
    user_id: &str,
    metadata: Option<&MemoryMetadata>,
) -> Result<Map<String, Value>> {
    let mut options = Map::new();
    options.insert("user_id".to_string(), json!(user_id));

    if let Some(meta) = metadata {
        if let Some(category) = &meta.category {
            options.insert("categories".to_string(), json!([category]));
        }
        if let Some(tags) = &meta.tags {
            if !tags.is_empty() {
                options.insert("filters".to_string(), json!({ "tags": tags }));
            }
        }
        options.insert("metadata".to_string(), serde_json::to_value(meta)?);
    }

    Ok(options)
}

/// Build the vendor filter object, keeping only sub-filters that are
/// actually populated. Returns None when nothing survives so the filters
/// key can be omitted from the request entirely.
fn build_search_filters(filters: Option<&SearchFilters>) -> Result<Option<Map<String, Value>>> {
    let Some(filters) = filters else {
        return Ok(None);
    };

    let mut out = Map::new();
    if let Some(category) = &filters.category {
        out.insert("category".to_string(), json!(category));
    }
    if let Some(tags) = &filters.tags {
        if !tags.is_empty() {
            out.insert("tags".to_string(), json!(tags));
        }
    }
    if let Some(min) = filters.importance_min {
        out.insert("importance".to_string(), json!({ "gte": min }));
    }
    if let Some(range) = &filters.date_range {
        let gte = parse_timestamp(&range.start)?;
        let lte = parse_timestamp(&range.end)?;
        out.insert("created_at".to_string(), json!({ "gte": gte, "lte": lte }));
    }

    Ok(if out.is_empty() { None } else { Some(out) })
}

fn parse_timestamp(value: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .map_err(|e| MemgateError::Validation(format!("invalid ISO-8601 date '{}': {}", value, e)))
}

/// Apply the requested ordering. Only importance re-sorts client-side;
/// relevance and date orders are whatever the vendor returned, untouched.
fn apply_sort(sort: SortOrder, hits: &mut [MemoryHit]) {
    if sort == SortOrder::Importance {
        sort_by_importance(hits);
    }
}

/// Stable descending sort by metadata importance; hits without importance
/// sort as 0 and equal importances keep their original relative order.
fn sort_by_importance(hits: &mut [MemoryHit]) {
    hits.sort_by(|a, b| b.importance().cmp(&a.importance()));
}

/// Pull the hit array out of whatever shape the vendor returned. The v2
/// endpoint returns a bare array, v1 wraps it in a results key; anything
/// else normalizes to an empty list.
fn extract_hits(payload: Value) -> Vec<MemoryHit> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Find the id of a freshly added memory in the add response, falling back
/// to the literal "unknown" when the vendor omits one.
fn extract_memory_id(payload: &Value) -> String {
    payload
        .get("id")
        .or_else(|| payload.get(0).and_then(|first| first.get("id")))
        .or_else(|| {
            payload
                .get("results")
                .and_then(|results| results.get(0))
                .and_then(|first| first.get("id"))
        })
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn hit(id: &str, importance: Option<u8>) -> MemoryHit {
        MemoryHit {
            id: Some(id.to_string()),
            memory: format!("memory {}", id),
            metadata: importance.map(|importance| MemoryMetadata {
                importance: Some(importance),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_effective_limit_clamps_ceiling_only() {
        assert_eq!(effective_limit(150), 100);
        assert_eq!(effective_limit(100), 100);
        assert_eq!(effective_limit(5), 5);
    }

    #[test]
    fn test_sort_by_importance_descending() {
        let mut hits = vec![hit("a", Some(3)), hit("b", Some(9)), hit("c", Some(5))];
        sort_by_importance(&mut hits);
        let order: Vec<u8> = hits.iter().map(MemoryHit::importance).collect();
        assert_eq!(order, vec![9, 5, 3]);
    }

    #[test]
    fn test_relevance_and_date_sorts_pass_through_unchanged() {
        let input = vec![hit("a", Some(3)), hit("b", Some(9)), hit("c", Some(5))];

        for sort in [SortOrder::Relevance, SortOrder::Date] {
            let mut hits = input.clone();
            apply_sort(sort, &mut hits);
            let ids: Vec<&str> = hits.iter().map(|h| h.id.as_deref().unwrap()).collect();
            assert_eq!(ids, vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn test_importance_sort_applies_through_dispatch() {
        let mut hits = vec![hit("a", Some(3)), hit("b", Some(9)), hit("c", Some(5))];
        apply_sort(SortOrder::Importance, &mut hits);
        let order: Vec<u8> = hits.iter().map(MemoryHit::importance).collect();
        assert_eq!(order, vec![9, 5, 3]);
    }

    #[test]
    fn test_sort_by_importance_ties_keep_input_order() {
        let mut hits = vec![
            hit("first", Some(5)),
            hit("second", Some(5)),
            hit("none", None),
            hit("top", Some(7)),
        ];
        sort_by_importance(&mut hits);
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_deref().unwrap()).collect();
        // missing importance sorts as 0, ties stay in original order
        assert_eq!(ids, vec!["top", "first", "second", "none"]);
    }

    #[test]
    fn test_add_options_without_metadata_has_no_derived_keys() {
        let options = build_add_options("alice", None).unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options["user_id"], json!("alice"));
        assert!(!options.contains_key("categories"));
        assert!(!options.contains_key("filters"));
        assert!(!options.contains_key("metadata"));
    }

    #[test]
    fn test_add_options_maps_category_and_tags() {
        let meta = MemoryMetadata {
            category: Some("work".to_string()),
            importance: Some(8),
            tags: Some(vec!["rust".to_string(), "mcp".to_string()]),
            source: Some("chat".to_string()),
        };
        let options = build_add_options("alice", Some(&meta)).unwrap();
        assert_eq!(options["categories"], json!(["work"]));
        assert_eq!(options["filters"], json!({ "tags": ["rust", "mcp"] }));
        assert_eq!(options["metadata"]["importance"], json!(8));
        assert_eq!(options["metadata"]["source"], json!("chat"));
    }

    #[test]
    fn test_add_options_empty_tags_omit_filters() {
        let meta = MemoryMetadata {
            tags: Some(vec![]),
            ..Default::default()
        };
        let options = build_add_options("alice", Some(&meta)).unwrap();
        assert!(!options.contains_key("filters"));
    }

    #[test]
    fn test_search_filters_absent_or_empty_is_none() {
        assert!(build_search_filters(None).unwrap().is_none());
        assert!(build_search_filters(Some(&SearchFilters::default()))
            .unwrap()
            .is_none());

        let empty_tags = SearchFilters {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(build_search_filters(Some(&empty_tags)).unwrap().is_none());
    }

    #[test]
    fn test_search_filters_importance_and_dates() {
        let filters = SearchFilters {
            category: Some("work".to_string()),
            importance_min: Some(7),
            date_range: Some(types::DateRange {
                start: "2024-01-01T00:00:00Z".to_string(),
                end: "2024-02-01T00:00:00Z".to_string(),
            }),
            ..Default::default()
        };
        let out = build_search_filters(Some(&filters)).unwrap().unwrap();
        assert_eq!(out["category"], json!("work"));
        assert_eq!(out["importance"], json!({ "gte": 7 }));
        assert_eq!(
            out["created_at"],
            json!({ "gte": 1704067200i64, "lte": 1706745600i64 })
        );
    }

    #[test]
    fn test_search_filters_bad_date_is_validation_error() {
        let filters = SearchFilters {
            date_range: Some(types::DateRange {
                start: "yesterday".to_string(),
                end: "2024-02-01T00:00:00Z".to_string(),
            }),
            ..Default::default()
        };
        let err = build_search_filters(Some(&filters)).unwrap_err();
        assert!(matches!(err, MemgateError::Validation(_)));
    }

    #[test]
    fn test_extract_hits_from_array_and_results_key() {
        let bare = json!([{ "id": "a", "memory": "x", "score": 0.5 }]);
        assert_eq!(extract_hits(bare).len(), 1);

        let wrapped = json!({ "results": [{ "id": "a" }, { "id": "b" }] });
        assert_eq!(extract_hits(wrapped).len(), 2);
    }

    #[test]
    fn test_extract_hits_non_array_normalizes_to_empty() {
        assert!(extract_hits(json!("nope")).is_empty());
        assert!(extract_hits(json!({ "results": "nope" })).is_empty());
        assert!(extract_hits(Value::Null).is_empty());
    }

    #[test]
    fn test_extract_memory_id_shapes() {
        assert_eq!(extract_memory_id(&json!({ "id": "m1" })), "m1");
        assert_eq!(extract_memory_id(&json!([{ "id": "m2" }])), "m2");
        assert_eq!(
            extract_memory_id(&json!({ "results": [{ "id": "m3" }] })),
            "m3"
        );
        assert_eq!(extract_memory_id(&json!({})), "unknown");
        assert_eq!(extract_memory_id(&Value::Null), "unknown");
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = Mem0Config::default();
        assert!(matches!(
            Mem0Client::new(&config),
            Err(MemgateError::Config(_))
        ));

        let config = Mem0Config {
            api_key: Some("".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Mem0Client::new(&config),
            Err(MemgateError::Config(_))
        ));
    }

    /// Fake store that only implements delete, for exercising the
    /// sequential bulk default.
    struct DeleteOnlyStore {
        fail_on: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl DeleteOnlyStore {
        fn new(fail_on: Option<&str>) -> Self {
            DeleteOnlyStore {
                fail_on: fail_on.map(str::to_string),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MemoryStore for DeleteOnlyStore {
        async fn add(&self, _: &str, _: &str, _: Option<&MemoryMetadata>) -> Result<String> {
            unreachable!("not exercised")
        }

        async fn search(
            &self,
            _: &str,
            _: &str,
            _: Option<&SearchFilters>,
            _: u32,
            _: SortOrder,
        ) -> Result<Vec<MemoryHit>> {
            unreachable!("not exercised")
        }

        async fn update(&self, _: &str, _: &str, _: &MemoryUpdates) -> Result<()> {
            unreachable!("not exercised")
        }

        async fn delete(&self, memory_id: &str, _: &str) -> Result<()> {
            self.calls.lock().unwrap().push(memory_id.to_string());
            if self.fail_on.as_deref() == Some(memory_id) {
                return Err(MemgateError::Api("not found".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_delete_many_continues_past_failures() {
        let store = DeleteOnlyStore::new(Some("B"));
        let ids = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let report = store.delete_many(&ids, "alice").await.unwrap();

        assert_eq!(report.deleted_count, 2);
        assert_eq!(
            report.errors,
            vec!["Failed to delete B: Mem0 API error: not found".to_string()]
        );
        assert!(!report.all_succeeded());
        // all three attempted, in input order
        assert_eq!(*store.calls.lock().unwrap(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_delete_many_empty_input_makes_no_calls() {
        let store = DeleteOnlyStore::new(None);
        let report = store.delete_many(&[], "alice").await.unwrap();

        assert_eq!(report, BulkDeleteReport::default());
        assert!(report.all_succeeded());
        assert!(store.calls.lock().unwrap().is_empty());
    }
}
