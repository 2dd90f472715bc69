//! # engram-storage
//!
//! Entity persistence over a pluggable key-value backend.
//!
//! The [`RecordStore`] owns entity lifecycle reads/writes, the by-type and
//! by-category secondary indexes, filtered search with a bounded scan
//! budget, and sampled analytics. The [`ResultCache`] layers TTL expiry
//! over the same backend for memoized query results. Two backends ship:
//! in-memory (tests) and SQLite (file-backed).

pub mod cache;
pub mod kv;
pub mod search;
pub mod store;

mod indexes;
mod stats;

pub use cache::ResultCache;
pub use kv::{MemoryKv, SqliteKv};
pub use search::SearchFilters;
pub use store::RecordStore;
