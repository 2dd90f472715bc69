//! Wire types for the vector index API. Field names follow the service's
//! camelCase JSON convention.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One vector to upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Metadata attached to every chunk vector. Carries enough to resolve a
/// match back to its entity and to delete all chunks of an entity by
/// filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub original_id: String,
    /// The chunk text itself.
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// Copy of the entity's own metadata fields.
    #[serde(flatten)]
    pub entity_fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpsertRequest<'a> {
    pub vectors: &'a [VectorRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<&'a str>,
}

/// Query parameters. `filter` uses the service's equality/range syntax.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    pub include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<IndexMatch>,
}

/// One ranked match from a query.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub vectors: BTreeMap<String, VectorRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateRequest<'a> {
    pub id: &'a str,
    pub set_metadata: &'a serde_json::Value,
}
