/// Engram system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Key prefix for primary entity records.
pub const ENTITY_KEY_PREFIX: &str = "entity:";

/// Key prefix for the by-type secondary index.
pub const TYPE_INDEX_PREFIX: &str = "index:type:";

/// Key prefix for the by-category secondary index.
pub const CATEGORY_INDEX_PREFIX: &str = "index:category:";

/// Key prefix for cached query results.
pub const CACHE_KEY_PREFIX: &str = "cache:";

/// Maximum keys returned by a single backend list call.
pub const MAX_KEY_SCAN: usize = 10_000;
