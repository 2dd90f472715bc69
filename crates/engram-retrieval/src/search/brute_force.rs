//! Brute-force semantic search over document embeddings in the store.
//!
//! Used when no remote index is configured. Candidates come from the
//! store's filtered search; entities missing a stored embedding get one
//! computed and persisted on the spot.

use tracing::{debug, warn};

use engram_core::config::RetrievalConfig;
use engram_core::entity::Entity;
use engram_core::errors::EngramResult;
use engram_core::outcome::{Source, Strategy};
use engram_core::query::QueryOptions;
use engram_core::traits::IEmbeddingProvider;
use engram_embeddings::chunker;
use engram_storage::SearchFilters;

use super::{SearchContext, SemanticSearch};
use crate::ranking::cosine;

pub struct BruteForceSearch {
    chunk_max_chars: usize,
}

impl BruteForceSearch {
    pub fn new(chunk_max_chars: usize) -> Self {
        Self { chunk_max_chars }
    }

    /// Candidate pool: the explicit id list when given, otherwise a
    /// filtered store search at the store's full search limit. The read
    /// limit is applied after ranking, not here.
    fn candidates(
        &self,
        ctx: &SearchContext<'_>,
        options: &QueryOptions,
    ) -> EngramResult<Vec<Entity>> {
        if let Some(ids) = &options.ids {
            return Ok(ids.iter().filter_map(|id| ctx.store.fetch_tolerant(id)).collect());
        }
        ctx.store.search(&SearchFilters {
            entity_type: options.entity_type.clone(),
            category: options.category.clone(),
            user_id: options.user_id.clone(),
            date_range: options.date_range,
            limit: Some(ctx.store.config().search_limit),
            ..Default::default()
        })
    }

    /// Return the entity's document embedding, computing and persisting
    /// one from its first chunk if absent. `None` means the candidate
    /// cannot be ranked and is skipped.
    fn embedding_of(&self, ctx: &SearchContext<'_>, entity: &mut Entity) -> Option<Vec<f32>> {
        if let Some(vector) = &entity.metadata.embedding {
            return Some(vector.clone());
        }

        let chunks = chunker::chunk(&entity.content, self.chunk_max_chars);
        let first = chunks.first()?;
        match ctx.provider.embed(first) {
            Ok(vector) => {
                entity.metadata.embedding = Some(vector.clone());
                if let Err(e) = ctx.store.put(entity) {
                    warn!(id = %entity.id, error = %e, "failed to persist backfilled embedding");
                }
                Some(vector)
            }
            Err(e) => {
                warn!(id = %entity.id, error = %e, "skipping candidate without embedding");
                None
            }
        }
    }
}

impl SemanticSearch for BruteForceSearch {
    fn strategy(&self) -> Strategy {
        Strategy::SemanticFallback
    }

    fn default_threshold(&self, config: &RetrievalConfig) -> f32 {
        config.fallback_threshold
    }

    fn search(
        &self,
        ctx: &SearchContext<'_>,
        query_vector: &[f32],
        options: &QueryOptions,
        limit: usize,
        threshold: f32,
    ) -> EngramResult<Vec<Source>> {
        let candidates = self.candidates(ctx, options)?;
        debug!(candidates = candidates.len(), threshold, "brute-force ranking");

        let mut sources: Vec<Source> = candidates
            .into_iter()
            .filter_map(|mut entity| {
                let vector = self.embedding_of(ctx, &mut entity)?;
                let score = cosine(query_vector, &vector);
                (score >= threshold).then(|| Source {
                    id: entity.id,
                    entity_type: Some(entity.entity_type),
                    content: Some(entity.content),
                    score,
                })
            })
            .collect();

        sources.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        sources.truncate(limit);
        Ok(sources)
    }
}
