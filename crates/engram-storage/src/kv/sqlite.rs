//! SQLite key-value backend, the file-backed binding.

use std::path::Path;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use engram_core::constants::MAX_KEY_SCAN;
use engram_core::errors::{EngramResult, StoreError};
use engram_core::traits::IKeyValueStore;

fn to_store_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::backend(e.to_string())
}

/// Single-connection SQLite store. One table, expiry column, lazy purge.
pub struct SqliteKv {
    conn: Mutex<Connection>,
}

impl SqliteKv {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> EngramResult<Self> {
        let conn = Connection::open(path).map_err(to_store_err)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> EngramResult<Self> {
        let conn = Connection::open_in_memory().map_err(to_store_err)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> EngramResult<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             CREATE TABLE IF NOT EXISTS kv (
                 key        TEXT PRIMARY KEY,
                 value      BLOB NOT NULL,
                 expires_at INTEGER
             );",
        )
        .map_err(to_store_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> EngramResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::backend("sqlite connection mutex poisoned").into())
    }
}

impl IKeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> EngramResult<Option<Vec<u8>>> {
        let now = Utc::now().timestamp();
        let conn = self.lock()?;
        let row: Option<(Vec<u8>, Option<i64>)> = conn
            .query_row(
                "SELECT value, expires_at FROM kv WHERE key = ?1",
                params![key],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()
            .map_err(to_store_err)?;

        match row {
            Some((_, Some(expires))) if expires <= now => {
                conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                    .map_err(to_store_err)?;
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8], ttl_secs: Option<u64>) -> EngramResult<()> {
        let expires_at =
            ttl_secs.map(|s| (Utc::now() + Duration::seconds(s as i64)).timestamp());
        self.lock()?
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)",
                params![key, value, expires_at],
            )
            .map_err(to_store_err)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> EngramResult<()> {
        self.lock()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(to_store_err)?;
        Ok(())
    }

    fn list_keys(&self, prefix: &str, limit: usize) -> EngramResult<Vec<String>> {
        let now = Utc::now().timestamp();
        // Half-open key range [prefix, prefix + U+10FFFF) covers every key
        // starting with the prefix, regardless of what it contains.
        let upper = format!("{prefix}\u{10FFFF}");
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT key FROM kv
                 WHERE key >= ?1 AND key < ?2
                   AND (expires_at IS NULL OR expires_at > ?3)
                 ORDER BY key
                 LIMIT ?4",
            )
            .map_err(to_store_err)?;
        let keys = stmt
            .query_map(
                params![prefix, upper, now, limit.min(MAX_KEY_SCAN) as i64],
                |r| r.get::<_, String>(0),
            )
            .map_err(to_store_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(to_store_err)?;
        Ok(keys)
    }
}
