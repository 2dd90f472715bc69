//! Key-value backend bindings for [`engram_core::traits::IKeyValueStore`].

mod memory;
mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;
