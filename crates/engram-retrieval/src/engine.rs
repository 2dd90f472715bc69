//! RetrievalEngine: CRUD with re-indexing, the strategy ladder, and
//! answer synthesis.
//!
//! Entry points return plain outcome structs. Expected failures (missing
//! fields, unknown ids, provider errors) are folded into failed outcomes
//! at this boundary; nothing here panics.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use engram_core::config::{EmbeddingConfig, EngramConfig};
use engram_core::entity::{Entity, EntityDraft, EntityPatch, Metadata};
use engram_core::errors::{EngramError, EngramResult};
use engram_core::outcome::{AnalyticsOutcome, BulkOutcome, MutationOutcome, ReadOutcome, Source, Strategy};
use engram_core::query::{QueryInput, QueryOptions};
use engram_core::traits::{IEmbeddingProvider, IKeyValueStore};
use engram_embeddings::{chunk, EmbeddingCache, HashedFallbackProvider, HttpEmbeddingProvider};
use engram_index::{original_id_filter, ChunkMetadata, VectorIndexClient, VectorRecord};
use engram_storage::{RecordStore, ResultCache};

use crate::answer;
use crate::cache_key::{self, GLOBAL_SCOPE};
use crate::search::{BruteForceSearch, RemoteIndexSearch, SearchContext, SemanticSearch};

/// Dimensionality of the default HTTP embedding model.
const HTTP_PROVIDER_DIMS: usize = 768;

/// Dimensionality of the hashed fallback provider.
const FALLBACK_PROVIDER_DIMS: usize = 256;

/// The engine: record store, embedding provider, optional remote vector
/// index, result cache, and the search backend picked at construction.
pub struct RetrievalEngine {
    store: RecordStore,
    cache: ResultCache,
    embedding_cache: EmbeddingCache,
    provider: Arc<dyn IEmbeddingProvider>,
    /// Present only when a remote index is configured. Used by the
    /// indexing and deletion paths; querying goes through `backend`.
    index: Option<VectorIndexClient>,
    backend: Box<dyn SemanticSearch>,
    config: EngramConfig,
}

impl RetrievalEngine {
    /// Build an engine over a backend and an explicit provider. The
    /// search backend is selected here, once: remote index configured
    /// means remote chunk-level search, otherwise brute-force over
    /// document embeddings.
    pub fn new(
        config: EngramConfig,
        kv: Arc<dyn IKeyValueStore>,
        provider: Arc<dyn IEmbeddingProvider>,
    ) -> Self {
        let store = RecordStore::new(Arc::clone(&kv), config.storage.clone());
        let cache = ResultCache::new(kv);
        let embedding_cache = EmbeddingCache::new(config.embedding.cache_capacity);

        let (index, backend): (Option<VectorIndexClient>, Box<dyn SemanticSearch>) =
            match &config.index {
                Some(index_config) => (
                    Some(VectorIndexClient::new(index_config.clone())),
                    Box::new(RemoteIndexSearch::new(VectorIndexClient::new(
                        index_config.clone(),
                    ))),
                ),
                None => (
                    None,
                    Box::new(BruteForceSearch::new(config.embedding.chunk_max_chars)),
                ),
            };

        info!(
            provider = provider.name(),
            remote_index = index.is_some(),
            "retrieval engine ready"
        );
        Self { store, cache, embedding_cache, provider, index, backend, config }
    }

    /// Build an engine with the provider implied by the embedding config:
    /// HTTP when an endpoint is set, hashed fallback otherwise.
    pub fn from_config(config: EngramConfig, kv: Arc<dyn IKeyValueStore>) -> Self {
        let provider = default_provider(&config.embedding);
        Self::new(config, kv, provider)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    // --- CRUD ---

    pub fn create(&self, draft: EntityDraft) -> MutationOutcome {
        let id = draft.id.clone();
        match self.try_create(draft) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(id, error = %e, "create failed");
                MutationOutcome::failed(id, e.to_string())
            }
        }
    }

    fn try_create(&self, draft: EntityDraft) -> EngramResult<MutationOutcome> {
        validate_draft(&draft)?;
        let now = Utc::now();
        let mut metadata = Metadata::stamped(now);
        metadata.category = draft.category;
        metadata.user_id = draft.user_id;
        metadata.status = draft.status;
        metadata.priority = draft.priority;
        metadata.tags = draft.tags;
        metadata.expires_at = draft.expires_at;
        metadata.extra = draft.extra;

        let mut entity = Entity {
            id: draft.id,
            entity_type: draft.entity_type,
            content: draft.content,
            metadata,
        };

        self.store.put(&entity)?;
        self.index_entity(&mut entity)?;
        self.store.put(&entity)?;
        self.invalidate_for(&entity.entity_type, entity.metadata.category.as_deref());

        info!(id = %entity.id, entity_type = %entity.entity_type, "entity created");
        Ok(MutationOutcome::ok(entity.id, 1, "created"))
    }

    pub fn update(&self, id: &str, patch: EntityPatch) -> MutationOutcome {
        match self.try_update(id, patch) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(id, error = %e, "update failed");
                MutationOutcome::failed(id, e.to_string())
            }
        }
    }

    fn try_update(&self, id: &str, patch: EntityPatch) -> EngramResult<MutationOutcome> {
        let Some(mut entity) = self.store.get(id)? else {
            return Err(EngramError::not_found(id));
        };
        let old_type = entity.entity_type.clone();
        let old_category = entity.metadata.category.clone();

        let content_changed = patch
            .content
            .as_ref()
            .is_some_and(|c| *c != entity.content);
        if let Some(content) = patch.content {
            entity.content = content;
        }
        if let Some(entity_type) = patch.entity_type {
            entity.entity_type = entity_type;
        }
        if let Some(category) = patch.category {
            entity.metadata.category = Some(category);
        }
        if let Some(user_id) = patch.user_id {
            entity.metadata.user_id = Some(user_id);
        }
        if let Some(status) = patch.status {
            entity.metadata.status = Some(status);
        }
        if let Some(priority) = patch.priority {
            entity.metadata.priority = Some(priority);
        }
        if let Some(tags) = patch.tags {
            entity.metadata.tags = tags;
        }
        if let Some(expires_at) = patch.expires_at {
            entity.metadata.expires_at = Some(expires_at);
        }
        // Shallow merge: patch keys win, untouched keys survive.
        for (key, value) in patch.extra {
            entity.metadata.extra.insert(key, value);
        }

        entity.metadata.previous_version = Some(entity.metadata.version);
        entity.metadata.version += 1;
        entity.metadata.updated_at = Utc::now();

        if content_changed {
            if let Some(client) = &self.index {
                client.delete_by_filter(&original_id_filter(id))?;
            }
            self.index_entity(&mut entity)?;
        }

        self.store.put(&entity)?;
        self.invalidate_for(&old_type, old_category.as_deref());
        self.invalidate_for(&entity.entity_type, entity.metadata.category.as_deref());

        info!(id, version = entity.metadata.version, content_changed, "entity updated");
        Ok(MutationOutcome::ok(id, entity.metadata.version, "updated"))
    }

    /// Idempotent delete. Remote-chunk cleanup failure is logged and
    /// swallowed; the primary deletion still reports success.
    pub fn delete(&self, id: &str) -> MutationOutcome {
        let existing = self.store.fetch_tolerant(id);

        if let Err(e) = self.store.remove(id) {
            warn!(id, error = %e, "delete failed");
            return MutationOutcome::failed(id, e.to_string());
        }

        if let Some(client) = &self.index {
            if let Err(e) = client.delete_by_filter(&original_id_filter(id)) {
                warn!(id, error = %e, "remote chunk cleanup failed, continuing");
            }
        }

        match existing {
            Some(entity) => {
                self.invalidate_for(&entity.entity_type, entity.metadata.category.as_deref())
            }
            // The record was absent or undecodable, so its type and
            // category scopes are unknown; drop the whole cache.
            None => self.cache.invalidate_all(),
        }

        info!(id, "entity deleted");
        MutationOutcome {
            success: true,
            id: id.to_string(),
            version: None,
            message: "deleted".to_string(),
        }
    }

    pub fn get_by_id(&self, id: &str) -> EngramResult<Option<Entity>> {
        self.store.get(id)
    }

    // --- Read ---

    /// Answer a query via the strategy ladder: direct lookup, then type
    /// filter, then semantic search. A rung that produces nothing falls
    /// through to the next.
    pub fn read(&self, query: impl Into<QueryInput>, options: &QueryOptions) -> ReadOutcome {
        let query = query.into();
        let limit = options.limit.unwrap_or(self.config.retrieval.default_limit);

        match &query {
            QueryInput::ById { id } => {
                if let Some(entity) = self.store.fetch_tolerant(id) {
                    debug!(id, "direct lookup hit");
                    let sources = vec![Source {
                        id: entity.id,
                        entity_type: Some(entity.entity_type),
                        content: Some(entity.content),
                        score: 1.0,
                    }];
                    return ReadOutcome {
                        success: true,
                        answer: answer::synthesize(id, &sources, options.response_style),
                        sources,
                        strategy: Strategy::DirectLookup,
                        confidence: 1.0,
                    };
                }
                debug!(id, "direct lookup miss, falling through");
            }
            QueryInput::ByType { entity_type } => {
                match self.store.list_by_type(entity_type, limit, 0) {
                    Ok(entities) if !entities.is_empty() => {
                        let sources: Vec<Source> = entities
                            .into_iter()
                            .map(|e| Source {
                                id: e.id,
                                entity_type: Some(e.entity_type),
                                content: Some(e.content),
                                score: 0.9,
                            })
                            .collect();
                        return ReadOutcome {
                            success: true,
                            answer: answer::synthesize(
                                entity_type,
                                &sources,
                                options.response_style,
                            ),
                            sources,
                            strategy: Strategy::TypeFilter,
                            confidence: 0.9,
                        };
                    }
                    Ok(_) => debug!(entity_type, "type filter empty, falling through"),
                    Err(e) => warn!(entity_type, error = %e, "type filter failed, falling through"),
                }
            }
            QueryInput::FreeText(_) => {}
        }

        self.semantic_read(&query.as_search_text(), options, limit)
    }

    fn semantic_read(&self, query_text: &str, options: &QueryOptions, limit: usize) -> ReadOutcome {
        let key = cache_key::derive(query_text, options);
        if let Some(mut cached) = self.cache.get::<ReadOutcome>(&key) {
            debug!(key, "query served from cache");
            cached.strategy = Strategy::Cached;
            return cached;
        }

        let query_vector = match self.embed_cached(query_text) {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "query embedding failed");
                return ReadOutcome::not_found(
                    format!("Search unavailable: {e}"),
                    self.backend.strategy(),
                );
            }
        };

        let threshold = options
            .threshold
            .unwrap_or_else(|| self.backend.default_threshold(&self.config.retrieval));
        let ctx = SearchContext { store: &self.store, provider: self.provider.as_ref() };

        let sources = match self.backend.search(&ctx, &query_vector, options, limit, threshold) {
            Ok(sources) => sources,
            Err(e) => {
                warn!(error = %e, "semantic search failed");
                return ReadOutcome::not_found(
                    format!("Search failed: {e}"),
                    self.backend.strategy(),
                );
            }
        };

        let outcome = ReadOutcome {
            success: !sources.is_empty(),
            answer: answer::synthesize(query_text, &sources, options.response_style),
            confidence: sources.first().map(|s| s.score).unwrap_or(0.0),
            sources,
            strategy: self.backend.strategy(),
        };
        self.cache.set(&key, &outcome, self.config.retrieval.cache_ttl_secs);
        outcome
    }

    // --- Bulk ---

    pub fn bulk_create(&self, drafts: Vec<EntityDraft>) -> BulkOutcome {
        self.bulk(drafts, |draft| self.create(draft))
    }

    pub fn bulk_update(&self, patches: Vec<(String, EntityPatch)>) -> BulkOutcome {
        self.bulk(patches, |(id, patch)| self.update(&id, patch))
    }

    pub fn bulk_delete(&self, ids: Vec<String>) -> BulkOutcome {
        self.bulk(ids, |id| self.delete(&id))
    }

    /// Sequential bulk driver with a throttling pause between items.
    /// Item failures are recorded, never aborting the remainder.
    fn bulk<T>(&self, items: Vec<T>, mut op: impl FnMut(T) -> MutationOutcome) -> BulkOutcome {
        let delay = Duration::from_millis(self.config.retrieval.bulk_item_delay_ms);
        let mut results = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }
            results.push(op(item));
        }
        BulkOutcome::from_results(results)
    }

    // --- Analytics ---

    pub fn get_analytics(&self) -> AnalyticsOutcome {
        match self.store.stats() {
            Ok(stats) => AnalyticsOutcome {
                success: true,
                stats: Some(stats),
                message: "ok".to_string(),
            },
            Err(e) => {
                warn!(error = %e, "analytics failed");
                AnalyticsOutcome { success: false, stats: None, message: e.to_string() }
            }
        }
    }

    // --- Indexing ---

    /// Embed the entity and mark it indexed. The first chunk's vector is
    /// stored on the entity as its document-level embedding; with a
    /// remote index configured, every chunk is embedded and upserted.
    fn index_entity(&self, entity: &mut Entity) -> EngramResult<()> {
        let chunks = chunk(&entity.content, self.config.embedding.chunk_max_chars);
        let Some(first) = chunks.first() else {
            return Err(EngramError::validation("content"));
        };

        entity.metadata.embedding = Some(self.embed_cached(first)?);
        entity.metadata.indexed = true;
        entity.metadata.indexed_at = Some(Utc::now());

        if let Some(client) = &self.index {
            let total = chunks.len();
            let entity_fields = chunk_entity_fields(entity);
            let mut records = Vec::with_capacity(total);
            for (i, text) in chunks.iter().enumerate() {
                records.push(VectorRecord {
                    id: Entity::chunk_id(&entity.id, i),
                    values: self.embed_cached(text)?,
                    metadata: Some(serde_json::to_value(ChunkMetadata {
                        original_id: entity.id.clone(),
                        content: text.clone(),
                        chunk_index: i,
                        total_chunks: total,
                        entity_fields: entity_fields.clone(),
                    })?),
                });
            }
            let upserted = client.batch_upsert(&records)?;
            debug!(id = %entity.id, chunks = upserted, "chunks upserted to remote index");
        }
        Ok(())
    }

    /// Embed through the content-hash cache, so re-indexing unchanged
    /// text never re-runs inference.
    fn embed_cached(&self, text: &str) -> EngramResult<Vec<f32>> {
        let key = EmbeddingCache::content_key(text);
        if let Some(vector) = self.embedding_cache.get(&key) {
            return Ok(vector);
        }
        let vector = self.provider.embed(text)?;
        self.embedding_cache.insert(key, vector.clone());
        Ok(vector)
    }

    /// Drop cached query results a mutation may have invalidated: the
    /// entity's type scope, its category scope, and the catch-all.
    fn invalidate_for(&self, entity_type: &str, category: Option<&str>) {
        self.cache.invalidate_scope(entity_type);
        if let Some(category) = category {
            self.cache.invalidate_scope(category);
        }
        self.cache.invalidate_scope(GLOBAL_SCOPE);
    }
}

/// Provider implied by the embedding config: HTTP when an endpoint is
/// set, hashed fallback otherwise.
pub fn default_provider(config: &EmbeddingConfig) -> Arc<dyn IEmbeddingProvider> {
    if config.endpoint.is_empty() {
        Arc::new(HashedFallbackProvider::new(FALLBACK_PROVIDER_DIMS))
    } else {
        Arc::new(HttpEmbeddingProvider::new(config.clone(), HTTP_PROVIDER_DIMS))
    }
}

fn validate_draft(draft: &EntityDraft) -> EngramResult<()> {
    if draft.id.trim().is_empty() {
        return Err(EngramError::validation("id"));
    }
    if draft.entity_type.trim().is_empty() {
        return Err(EngramError::validation("type"));
    }
    if draft.content.trim().is_empty() {
        return Err(EngramError::validation("content"));
    }
    Ok(())
}

/// The entity metadata copied onto every chunk vector: the serialized
/// metadata minus the bulky document embedding, plus the entity type so
/// remote filters can match on it.
fn chunk_entity_fields(
    entity: &Entity,
) -> std::collections::BTreeMap<String, serde_json::Value> {
    let mut fields = match serde_json::to_value(&entity.metadata) {
        Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
        _ => std::collections::BTreeMap::new(),
    };
    fields.remove("embedding");
    fields.insert(
        "type".to_string(),
        serde_json::Value::String(entity.entity_type.clone()),
    );
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_storage::MemoryKv;

    fn engine() -> RetrievalEngine {
        RetrievalEngine::from_config(EngramConfig::default(), Arc::new(MemoryKv::new()))
    }

    fn draft(id: &str, entity_type: &str, content: &str) -> EntityDraft {
        EntityDraft {
            id: id.to_string(),
            entity_type: entity_type.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn create_validates_required_fields() {
        let engine = engine();
        let missing_content = draft("a", "note", "  ");
        let outcome = engine.create(missing_content);
        assert!(!outcome.success);
        assert!(outcome.message.contains("content"));

        let missing_type = draft("a", "", "text");
        assert!(!engine.create(missing_type).success);
        let missing_id = draft("", "note", "text");
        assert!(!engine.create(missing_id).success);
    }

    #[test]
    fn create_stamps_and_indexes() {
        let engine = engine();
        let outcome = engine.create(draft("m1", "meeting", "Budget approved in meeting."));
        assert!(outcome.success);
        assert_eq!(outcome.version, Some(1));

        let entity = engine.get_by_id("m1").unwrap().unwrap();
        assert!(entity.metadata.indexed);
        assert!(entity.metadata.indexed_at.is_some());
        assert!(entity.metadata.embedding.is_some());
        assert_eq!(entity.metadata.version, 1);
    }

    #[test]
    fn update_bumps_version_and_tracks_previous() {
        let engine = engine();
        engine.create(draft("m1", "meeting", "Original content here."));

        let outcome = engine.update(
            "m1",
            EntityPatch { content: Some("Revised content here.".to_string()), ..Default::default() },
        );
        assert!(outcome.success);
        assert_eq!(outcome.version, Some(2));

        let entity = engine.get_by_id("m1").unwrap().unwrap();
        assert_eq!(entity.metadata.version, 2);
        assert_eq!(entity.metadata.previous_version, Some(1));
        assert_eq!(entity.content, "Revised content here.");
    }

    #[test]
    fn update_missing_id_fails() {
        let outcome = engine().update("ghost", EntityPatch::default());
        assert!(!outcome.success);
        assert!(outcome.message.contains("not found"));
    }

    #[test]
    fn update_merges_extra_shallowly() {
        let engine = engine();
        let mut d = draft("m1", "note", "content body");
        d.extra.insert("kept".to_string(), serde_json::json!(1));
        d.extra.insert("replaced".to_string(), serde_json::json!("old"));
        engine.create(d);

        let mut patch = EntityPatch::default();
        patch.extra.insert("replaced".to_string(), serde_json::json!("new"));
        engine.update("m1", patch);

        let entity = engine.get_by_id("m1").unwrap().unwrap();
        assert_eq!(entity.metadata.extra.get("kept"), Some(&serde_json::json!(1)));
        assert_eq!(entity.metadata.extra.get("replaced"), Some(&serde_json::json!("new")));
    }

    #[test]
    fn unchanged_content_keeps_embedding_without_reindex() {
        let engine = engine();
        engine.create(draft("m1", "note", "stable content"));
        let before = engine.get_by_id("m1").unwrap().unwrap();

        engine.update(
            "m1",
            EntityPatch { status: Some("archived".to_string()), ..Default::default() },
        );
        let after = engine.get_by_id("m1").unwrap().unwrap();
        assert_eq!(after.metadata.embedding, before.metadata.embedding);
        assert_eq!(after.metadata.status.as_deref(), Some("archived"));
    }

    #[test]
    fn delete_is_idempotent() {
        let engine = engine();
        engine.create(draft("m1", "note", "to be removed"));
        assert!(engine.delete("m1").success);
        assert!(engine.delete("m1").success);
        assert!(engine.get_by_id("m1").unwrap().is_none());
    }

    #[test]
    fn deleting_a_corrupt_record_still_invalidates_scoped_cache() {
        let engine = engine();
        engine.create(draft("n1", "note", "Budget planning session notes."));

        let options = QueryOptions {
            entity_type: Some("note".to_string()),
            threshold: Some(0.1),
            ..Default::default()
        };
        assert!(engine.read("budget planning", &options).success);
        assert_eq!(engine.read("budget planning", &options).strategy, Strategy::Cached);

        // Corrupt the stored record so delete cannot learn its scopes.
        engine
            .store()
            .backend()
            .put("entity:n1", b"not json", None)
            .unwrap();
        assert!(engine.delete("n1").success);

        let after = engine.read("budget planning", &options);
        assert_ne!(after.strategy, Strategy::Cached);
        assert!(after.sources.is_empty());
    }

    #[test]
    fn bulk_create_reports_per_item_outcomes() {
        let mut config = EngramConfig::default();
        config.retrieval.bulk_item_delay_ms = 0;
        let engine = RetrievalEngine::from_config(config, Arc::new(MemoryKv::new()));

        let outcome = engine.bulk_create(vec![
            draft("a", "note", "first"),
            draft("b", "", "invalid"),
            draft("c", "note", "third"),
        ]);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);
        assert!(!outcome.results[1].success);
        assert!(engine.get_by_id("c").unwrap().is_some());
    }

    #[test]
    fn analytics_wraps_store_stats() {
        let engine = engine();
        engine.create(draft("a", "note", "one"));
        engine.create(draft("b", "doc", "two"));

        let analytics = engine.get_analytics();
        assert!(analytics.success);
        let stats = analytics.stats.unwrap();
        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.by_type.get("note"), Some(&1));
    }

    #[test]
    fn chunk_fields_carry_type_and_drop_embedding() {
        let mut entity = Entity {
            id: "m1".to_string(),
            entity_type: "meeting".to_string(),
            content: "x".to_string(),
            metadata: Metadata::stamped(Utc::now()),
        };
        entity.metadata.embedding = Some(vec![0.1; 8]);
        entity.metadata.category = Some("work".to_string());

        let fields = chunk_entity_fields(&entity);
        assert_eq!(fields.get("type"), Some(&serde_json::json!("meeting")));
        assert_eq!(fields.get("category"), Some(&serde_json::json!("work")));
        assert!(!fields.contains_key("embedding"));
    }
}
