//! Default values shared by the config structs.

/// Characters of input sent to the embedding provider before truncation.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 2048;

/// Maximum characters per content chunk.
pub const DEFAULT_CHUNK_MAX_CHARS: usize = 400;

/// Minimum match score when querying the remote vector index.
/// Chunk-level embeddings are finer-grained, so the bar is higher.
pub const DEFAULT_REMOTE_THRESHOLD: f32 = 0.3;

/// Minimum match score for the brute-force document-embedding fallback.
/// Document-level embeddings are coarser than chunk-level ones, so the
/// bar is lower than the remote one.
pub const DEFAULT_FALLBACK_THRESHOLD: f32 = 0.25;

/// Default result limit for read queries.
pub const DEFAULT_READ_LIMIT: usize = 10;

/// Default result limit for filtered store searches.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

/// Scan budget multiplier: a search examines at most `factor × limit`
/// candidates before giving up. Trades completeness for a hard ceiling on
/// store I/O under the full-scan fallback.
pub const DEFAULT_SEARCH_SCAN_FACTOR: usize = 3;

/// TTL for cached query results.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Retention applied to entities without an explicit `expires_at`.
pub const DEFAULT_RETENTION_SECS: u64 = 365 * 24 * 60 * 60;

/// Entity count above which `stats()` samples and extrapolates.
pub const DEFAULT_STATS_SAMPLE_THRESHOLD: usize = 1000;

/// Vectors per upsert batch sent to the remote index.
pub const DEFAULT_UPSERT_BATCH_SIZE: usize = 100;

/// Pause between upsert batches, bounding request rate.
pub const DEFAULT_UPSERT_BATCH_DELAY_MS: u64 = 200;

/// Pause between items in bulk CRUD operations.
pub const DEFAULT_BULK_ITEM_DELAY_MS: u64 = 50;

/// Capacity of the in-memory embedding cache.
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: u64 = 10_000;
