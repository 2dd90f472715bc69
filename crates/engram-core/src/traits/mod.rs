//! Boundary traits. The engine consumes a key-value store and an embedding
//! provider through these; concrete bindings live in the leaf crates.

mod embedding;
mod kv;

pub use embedding::IEmbeddingProvider;
pub use kv::IKeyValueStore;
