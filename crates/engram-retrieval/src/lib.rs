//! # engram-retrieval
//!
//! The retrieval orchestrator. [`RetrievalEngine`] composes the record
//! store, an embedding provider, an optional remote vector index, and the
//! result cache into the public CRUD/read/analytics surface.
//!
//! Reads run a strategy ladder: direct id lookup, then type filtering,
//! then semantic search (remote chunk-level when a vector index is
//! configured, brute-force over document embeddings otherwise), with
//! results cached per invalidation scope.

pub mod answer;
pub mod cache_key;
pub mod engine;
pub mod ranking;
pub mod search;

pub use engine::{default_provider, RetrievalEngine};
pub use ranking::cosine;
pub use search::{BruteForceSearch, RemoteIndexSearch, SearchContext, SemanticSearch};
