//! RecordStore: entity lifecycle over the key-value backend.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use engram_core::config::StorageConfig;
use engram_core::constants::{ENTITY_KEY_PREFIX, MAX_KEY_SCAN};
use engram_core::entity::Entity;
use engram_core::errors::{EngramResult, StoreError};
use engram_core::stats::StoreStats;
use engram_core::traits::IKeyValueStore;

use crate::indexes;
use crate::search::SearchFilters;
use crate::stats;

pub(crate) fn entity_key(id: &str) -> String {
    format!("{ENTITY_KEY_PREFIX}{id}")
}

/// Entity persistence plus the by-type and by-category secondary indexes.
pub struct RecordStore {
    kv: Arc<dyn IKeyValueStore>,
    config: StorageConfig,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn IKeyValueStore>, config: StorageConfig) -> Self {
        Self { kv, config }
    }

    /// The underlying backend, shared with the result cache.
    pub fn backend(&self) -> Arc<dyn IKeyValueStore> {
        Arc::clone(&self.kv)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Serialize and write the entity, then update both secondary indexes.
    /// Index appends are idempotent; calling `put` twice is safe.
    pub fn put(&self, entity: &Entity) -> EngramResult<()> {
        let blob = serde_json::to_vec(entity)?;
        let ttl = match entity.metadata.expires_at {
            Some(at) => (at - Utc::now()).num_seconds().max(0) as u64,
            None => self.config.default_retention_secs,
        };
        self.kv.put(&entity_key(&entity.id), &blob, Some(ttl))?;

        indexes::append(&self.kv, &indexes::type_index_key(&entity.entity_type), &entity.id)?;
        if let Some(category) = &entity.metadata.category {
            indexes::append(&self.kv, &indexes::category_index_key(category), &entity.id)?;
        }
        Ok(())
    }

    /// Fetch an entity. Lazy expiry: an entity past its `expires_at` is
    /// deleted as a side effect and reported absent.
    pub fn get(&self, id: &str) -> EngramResult<Option<Entity>> {
        let Some(blob) = self.kv.get(&entity_key(id))? else {
            return Ok(None);
        };
        let entity: Entity = serde_json::from_slice(&blob)
            .map_err(|e| StoreError::corruption(format!("entity {id}: {e}")))?;

        if entity.metadata.is_expired(Utc::now()) {
            debug!(id, "entity expired, removing");
            self.remove(id)?;
            return Ok(None);
        }
        Ok(Some(entity))
    }

    /// Delete an entity and prune it from both secondary indexes.
    /// Idempotent: reports success even if the id never existed.
    pub fn remove(&self, id: &str) -> EngramResult<bool> {
        // Read first to learn which indexes reference this id.
        let existing = match self.kv.get(&entity_key(id))? {
            Some(blob) => serde_json::from_slice::<Entity>(&blob).ok(),
            None => None,
        };

        self.kv.delete(&entity_key(id))?;

        if let Some(entity) = existing {
            indexes::remove(&self.kv, &indexes::type_index_key(&entity.entity_type), id)?;
            if let Some(category) = &entity.metadata.category {
                indexes::remove(&self.kv, &indexes::category_index_key(category), id)?;
            }
        }
        Ok(true)
    }

    /// Entities of a type, in index order. Dangling index entries (id
    /// present in the index, record gone) are silently skipped, as are
    /// records whose type changed after the index entry was written.
    pub fn list_by_type(
        &self,
        entity_type: &str,
        limit: usize,
        offset: usize,
    ) -> EngramResult<Vec<Entity>> {
        let ids = indexes::load(&self.kv, &indexes::type_index_key(entity_type))?;
        Ok(ids
            .iter()
            .filter_map(|id| self.fetch_tolerant(id))
            .filter(|e| e.entity_type == entity_type)
            .skip(offset)
            .take(limit)
            .collect())
    }

    /// Entities of a category. Symmetric to [`Self::list_by_type`].
    pub fn list_by_category(&self, category: &str, limit: usize) -> EngramResult<Vec<Entity>> {
        let ids = indexes::load(&self.kv, &indexes::category_index_key(category))?;
        Ok(ids
            .iter()
            .filter_map(|id| self.fetch_tolerant(id))
            .filter(|e| e.metadata.category.as_deref() == Some(category))
            .take(limit)
            .collect())
    }

    /// Filtered search. Candidate selection prefers the most specific
    /// index (type, else category, else a full prefix scan), then applies
    /// the filters in order, stopping at `limit` results or after
    /// examining `scan_factor × limit` candidates.
    pub fn search(&self, filters: &SearchFilters) -> EngramResult<Vec<Entity>> {
        let limit = filters.limit.unwrap_or(self.config.search_limit);
        let budget = limit.saturating_mul(self.config.search_scan_factor);

        let candidate_ids: Vec<String> = if let Some(entity_type) = &filters.entity_type {
            indexes::load(&self.kv, &indexes::type_index_key(entity_type))?
        } else if let Some(category) = &filters.category {
            indexes::load(&self.kv, &indexes::category_index_key(category))?
        } else {
            // The expensive path: no index narrows the scan.
            warn!("search falling back to full entity scan");
            self.kv
                .list_keys(ENTITY_KEY_PREFIX, MAX_KEY_SCAN)?
                .into_iter()
                .map(|k| k[ENTITY_KEY_PREFIX.len()..].to_string())
                .collect()
        };

        let mut results = Vec::new();
        for id in candidate_ids.iter().take(budget) {
            if results.len() >= limit {
                break;
            }
            let Some(entity) = self.fetch_tolerant(id) else {
                continue;
            };
            if filters.matches(&entity, entity.metadata.created_at) {
                results.push(entity);
            }
        }

        debug!(
            results = results.len(),
            examined = candidate_ids.len().min(budget),
            "search complete"
        );
        Ok(results)
    }

    /// Aggregate analytics. Above the sampling threshold this scans a key
    /// prefix sample and extrapolates counts linearly: an estimate by
    /// contract, not a bug.
    pub fn stats(&self) -> EngramResult<StoreStats> {
        stats::compute(&self.kv, &self.config)
    }

    /// Fetch that treats missing and corrupt records the same way the
    /// index-backed read paths do: skip and move on.
    pub fn fetch_tolerant(&self, id: &str) -> Option<Entity> {
        match self.get(id) {
            Ok(found) => found,
            Err(e) => {
                warn!(id, error = %e, "skipping unreadable entity");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use engram_core::entity::Metadata;

    use crate::kv::MemoryKv;

    fn store() -> RecordStore {
        RecordStore::new(Arc::new(MemoryKv::new()), StorageConfig::default())
    }

    fn entity(id: &str, entity_type: &str, content: &str) -> Entity {
        Entity {
            id: id.to_string(),
            entity_type: entity_type.to_string(),
            content: content.to_string(),
            metadata: Metadata::stamped(Utc::now()),
        }
    }

    #[test]
    fn put_get_roundtrip() {
        let store = store();
        store.put(&entity("n1", "note", "hello")).unwrap();
        let got = store.get("n1").unwrap().expect("entity should exist");
        assert_eq!(got.content, "hello");
        assert_eq!(got.entity_type, "note");
    }

    #[test]
    fn get_missing_is_none() {
        assert!(store().get("nope").unwrap().is_none());
    }

    #[test]
    fn expired_entity_is_lazily_deleted() {
        let store = store();
        let mut e = entity("old", "note", "stale");
        e.metadata.expires_at = Some(Utc::now() - Duration::seconds(5));
        // Write the blob directly: put() would hand the backend a zero TTL
        // and the backend would hide it before our lazy-expiry path runs.
        let blob = serde_json::to_vec(&e).unwrap();
        store.kv.put(&entity_key("old"), &blob, None).unwrap();

        assert!(store.get("old").unwrap().is_none());
        assert!(store.kv.get(&entity_key("old")).unwrap().is_none());
    }

    #[test]
    fn remove_is_idempotent_and_prunes_indexes() {
        let store = store();
        let mut e = entity("n1", "note", "x");
        e.metadata.category = Some("work".to_string());
        store.put(&e).unwrap();

        assert!(store.remove("n1").unwrap());
        assert!(store.remove("n1").unwrap());
        assert!(store.remove("never-existed").unwrap());

        assert!(store.list_by_type("note", 10, 0).unwrap().is_empty());
        assert!(store.list_by_category("work", 10).unwrap().is_empty());
    }

    #[test]
    fn list_by_type_paginates() {
        let store = store();
        for i in 0..5 {
            store.put(&entity(&format!("n{i}"), "note", "c")).unwrap();
        }
        let page = store.list_by_type("note", 2, 1).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "n1");
        assert_eq!(page[1].id, "n2");
    }

    #[test]
    fn list_skips_dangling_index_entries() {
        let store = store();
        store.put(&entity("a", "note", "x")).unwrap();
        store.put(&entity("b", "note", "y")).unwrap();
        // Delete the record but not the index entry.
        store.kv.delete(&entity_key("a")).unwrap();

        let listed = store.list_by_type("note", 10, 0).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "b");
    }

    #[test]
    fn list_by_type_skips_records_whose_type_changed() {
        let store = store();
        store.put(&entity("a", "note", "x")).unwrap();
        // Rewrite under a new type; the old index entry goes stale.
        store.put(&entity("a", "doc", "x")).unwrap();

        assert!(store.list_by_type("note", 10, 0).unwrap().is_empty());
        let docs = store.list_by_type("doc", 10, 0).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "a");
    }

    #[test]
    fn search_prefers_type_index_and_applies_filters() {
        let store = store();
        let mut e1 = entity("n1", "note", "quarterly budget report");
        e1.metadata.user_id = Some("u1".to_string());
        let mut e2 = entity("n2", "note", "meeting minutes");
        e2.metadata.user_id = Some("u2".to_string());
        store.put(&e1).unwrap();
        store.put(&e2).unwrap();

        let results = store
            .search(&SearchFilters {
                entity_type: Some("note".to_string()),
                user_id: Some("u1".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "n1");
    }

    #[test]
    fn search_excludes_records_whose_type_changed() {
        let store = store();
        store.put(&entity("e1", "note", "shared content")).unwrap();
        // Rewrite under a new type; the note index entry goes stale.
        store.put(&entity("e1", "doc", "shared content")).unwrap();

        let stale = store
            .search(&SearchFilters {
                entity_type: Some("note".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(stale.is_empty());

        let current = store
            .search(&SearchFilters {
                entity_type: Some("doc".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].entity_type, "doc");
    }

    #[test]
    fn search_full_scan_honors_limit() {
        let store = store();
        for i in 0..20 {
            store.put(&entity(&format!("e{i:02}"), "doc", "same text")).unwrap();
        }
        let results = store
            .search(&SearchFilters {
                text: Some("same".to_string()),
                limit: Some(5),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn search_scan_budget_caps_examined_candidates() {
        let store = store();
        // 10 non-matching entities ahead of a matching one; budget 3×1 = 3
        // candidates means the match is never reached.
        for i in 0..10 {
            store.put(&entity(&format!("m{i:02}"), "doc", "irrelevant")).unwrap();
        }
        store.put(&entity("m99", "doc", "needle")).unwrap();

        let results = store
            .search(&SearchFilters {
                entity_type: Some("doc".to_string()),
                text: Some("needle".to_string()),
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn corrupt_record_is_skipped_in_search_but_fails_get() {
        let store = store();
        store.put(&entity("ok", "note", "fine")).unwrap();
        store.kv.put(&entity_key("bad"), b"not json", None).unwrap();
        indexes::append(&store.kv, &indexes::type_index_key("note"), "bad").unwrap();

        assert!(matches!(
            store.get("bad"),
            Err(engram_core::EngramError::Store(StoreError::Corruption { .. }))
        ));

        let results = store
            .search(&SearchFilters {
                entity_type: Some("note".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "ok");
    }
}
