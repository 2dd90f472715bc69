//! Remote-index semantic search: chunk-level vectors, server-side filters.

use tracing::debug;

use engram_core::config::RetrievalConfig;
use engram_core::errors::EngramResult;
use engram_core::outcome::{Source, Strategy};
use engram_core::query::QueryOptions;
use engram_index::{QueryRequest, VectorIndexClient};

use super::{SearchContext, SemanticSearch};

pub struct RemoteIndexSearch {
    client: VectorIndexClient,
}

impl RemoteIndexSearch {
    pub fn new(client: VectorIndexClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &VectorIndexClient {
        &self.client
    }

    /// Equality/range filter over chunk metadata, built from the options.
    fn build_filter(options: &QueryOptions) -> Option<serde_json::Value> {
        let mut filter = serde_json::Map::new();
        if let Some(entity_type) = &options.entity_type {
            filter.insert("type".to_string(), serde_json::json!({ "$eq": entity_type }));
        }
        if let Some(category) = &options.category {
            filter.insert("category".to_string(), serde_json::json!({ "$eq": category }));
        }
        if let Some(user_id) = &options.user_id {
            filter.insert("user_id".to_string(), serde_json::json!({ "$eq": user_id }));
        }
        if let Some(range) = &options.date_range {
            // RFC 3339 UTC timestamps compare correctly as strings.
            filter.insert(
                "created_at".to_string(),
                serde_json::json!({ "$gte": range.start, "$lte": range.end }),
            );
        }
        if filter.is_empty() {
            None
        } else {
            Some(serde_json::Value::Object(filter))
        }
    }
}

impl SemanticSearch for RemoteIndexSearch {
    fn strategy(&self) -> Strategy {
        Strategy::Semantic
    }

    fn default_threshold(&self, config: &RetrievalConfig) -> f32 {
        config.remote_threshold
    }

    fn search(
        &self,
        _ctx: &SearchContext<'_>,
        query_vector: &[f32],
        options: &QueryOptions,
        limit: usize,
        threshold: f32,
    ) -> EngramResult<Vec<Source>> {
        let matches = self.client.query(QueryRequest {
            vector: query_vector.to_vec(),
            top_k: limit,
            filter: Self::build_filter(options),
            include_metadata: true,
            namespace: None,
        })?;
        debug!(matches = matches.len(), threshold, "remote index responded");

        let sources = matches
            .into_iter()
            .filter(|m| m.score >= threshold)
            .map(|m| {
                let metadata = m.metadata.unwrap_or_default();
                // Resolve the chunk back to its entity. The originalId
                // field is authoritative; the chunk-id suffix is the
                // fallback for vectors indexed without metadata.
                let id = metadata
                    .get("originalId")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        m.id.split_once("_chunk_")
                            .map(|(entity_id, _)| entity_id.to_string())
                            .unwrap_or_else(|| m.id.clone())
                    });
                Source {
                    id,
                    entity_type: metadata
                        .get("type")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                    content: metadata
                        .get("content")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                    score: m.score,
                }
            })
            .collect();
        Ok(sources)
    }
}
