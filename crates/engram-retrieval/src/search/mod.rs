//! Semantic-search backends.
//!
//! The backend is chosen once at engine construction from configuration:
//! remote index present → [`RemoteIndexSearch`], otherwise
//! [`BruteForceSearch`] over document embeddings cached in the store.
//! Presence checks never leak into the query path.

mod brute_force;
mod remote;

pub use brute_force::BruteForceSearch;
pub use remote::RemoteIndexSearch;

use engram_core::config::RetrievalConfig;
use engram_core::errors::EngramResult;
use engram_core::outcome::{Source, Strategy};
use engram_core::query::QueryOptions;
use engram_core::traits::IEmbeddingProvider;
use engram_storage::RecordStore;

/// Shared state handed to a backend for one search.
pub struct SearchContext<'a> {
    pub store: &'a RecordStore,
    pub provider: &'a dyn IEmbeddingProvider,
}

/// A semantic-search strategy over an embedded query.
pub trait SemanticSearch: Send + Sync {
    /// Strategy label stamped on results from this backend.
    fn strategy(&self) -> Strategy;

    /// Score floor used when the caller does not override the threshold.
    fn default_threshold(&self, config: &RetrievalConfig) -> f32;

    /// Rank candidates against the query vector. Returns at most `limit`
    /// sources, all scoring at least `threshold`, descending by score.
    fn search(
        &self,
        ctx: &SearchContext<'_>,
        query_vector: &[f32],
        options: &QueryOptions,
        limit: usize,
        threshold: f32,
    ) -> EngramResult<Vec<Source>>;
}
