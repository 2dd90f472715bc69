use crate::errors::EngramResult;

/// Key-value persistence boundary. Blobs in, blobs out; the store owns
/// nothing about entity shape.
pub trait IKeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> EngramResult<Option<Vec<u8>>>;

    /// Write a blob. `ttl_secs` lets the backend expire the key on its own;
    /// backends without native TTL may ignore it (the record store layers
    /// lazy expiry on top either way).
    fn put(&self, key: &str, value: &[u8], ttl_secs: Option<u64>) -> EngramResult<()>;

    fn delete(&self, key: &str) -> EngramResult<()>;

    /// List up to `limit` keys sharing `prefix`, in lexicographic order.
    /// Backends cap a single call at roughly [`crate::constants::MAX_KEY_SCAN`].
    fn list_keys(&self, prefix: &str, limit: usize) -> EngramResult<Vec<String>>;
}
