//! # engram-embeddings
//!
//! Embedding providers and the content chunker.
//!
//! Two providers implement [`engram_core::traits::IEmbeddingProvider`]:
//! an HTTP client for a hosted inference endpoint, and a deterministic
//! hashed term-frequency fallback that works air-gapped. An in-memory
//! cache keyed by content hash sits in front of either.

pub mod cache;
pub mod chunker;
pub mod providers;

pub use cache::EmbeddingCache;
pub use chunker::chunk;
pub use providers::{HashedFallbackProvider, HttpEmbeddingProvider};
