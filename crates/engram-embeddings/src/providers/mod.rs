//! Embedding provider implementations.

mod hashed_fallback;
mod http_provider;

pub use hashed_fallback::HashedFallbackProvider;
pub use http_provider::HttpEmbeddingProvider;
