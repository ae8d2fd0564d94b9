use anyhow::{Result, anyhow};
use fjall::Keyspace;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// On-disk key/value store with per-entry expiry.
///
/// Opened explicitly by the caller and passed to whoever needs it.
pub struct PersistentCache {
    store: Keyspace,
}

fn get_from_store(store: &Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl PersistentCache {
    /// Open (or create) the cache database under `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(PersistentCache { store: items })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub fn put<T: Serialize + Debug>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        self.store.insert(key.as_bytes().to_vec(), bytes)?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = get_from_store(&self.store, key.as_bytes().to_vec())? else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

        if now < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key)?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key.as_bytes().to_vec())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_get_remove() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("answer", &vec![1.5_f64, 2.5], Duration::from_secs(3600))
            .unwrap();
        let value: Option<Vec<f64>> = cache.get("answer").unwrap();
        assert_eq!(value, Some(vec![1.5, 2.5]));

        cache.remove("answer").unwrap();
        let value: Option<Vec<f64>> = cache.get("answer").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache.put("stale", &42_u32, Duration::ZERO).unwrap();
        let value: Option<u32> = cache.get("stale").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_missing_key() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let value: Option<String> = cache.get("nothing").unwrap();
        assert!(value.is_none());
    }
}
