//! # engram-index
//!
//! Thin blocking client for the remote vector index. Every call is a
//! single HTTP round trip; any non-2xx response is a hard failure
//! carrying status and body. The index is used only through its
//! upsert/query/delete surface; its internal ANN algorithm is opaque.

pub mod client;
pub mod types;

pub use client::{original_id_filter, VectorIndexClient};
pub use types::{ChunkMetadata, IndexMatch, QueryRequest, VectorRecord};
