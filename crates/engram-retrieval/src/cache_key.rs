//! Deterministic cache keys for semantic-search results.

use engram_core::query::QueryOptions;
use engram_storage::cache::cache_key;

/// Invalidation scope for a query: the type filter if present, else the
/// category filter, else the catch-all scope. Mutations invalidate the
/// scopes their entity belongs to plus the catch-all.
pub const GLOBAL_SCOPE: &str = "any";

pub fn scope_for(options: &QueryOptions) -> String {
    options
        .entity_type
        .clone()
        .or_else(|| options.category.clone())
        .unwrap_or_else(|| GLOBAL_SCOPE.to_string())
}

/// Derive the cache key for a query. Deterministic function of the query
/// text and every option that shapes the result.
pub fn derive(query_text: &str, options: &QueryOptions) -> String {
    let payload = serde_json::to_vec(&(query_text, options))
        .unwrap_or_else(|_| format!("{query_text}|{options:?}").into_bytes());
    let digest = blake3::hash(&payload).to_hex().to_string();
    cache_key(&scope_for(options), &digest)
}
