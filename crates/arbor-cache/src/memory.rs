//! Process-local cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::{Cache, CacheBucket};

struct MemoryEntry {
    etag: String,
    value: Vec<u8>,
    stored_at: Instant,
}

type Buckets = HashMap<String, HashMap<String, MemoryEntry>>;

/// In-memory [`Cache`] shared by all buckets it hands out.
///
/// Entries live as long as the cache. Buckets obtained with the same name
/// see the same entries.
#[derive(Clone, Default)]
pub struct MemoryCache {
    buckets: Arc<Mutex<Buckets>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            buckets: Arc::clone(&self.buckets),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    buckets: Arc<Mutex<Buckets>>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let buckets = self.buckets.lock().ok()?;
        let entry = buckets.get(&self.name)?.get(key)?;

        if !etag.is_empty() && entry.etag != etag {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let Ok(mut buckets) = self.buckets.lock() else {
            return;
        };
        buckets.entry(self.name.clone()).or_default().insert(
            key.to_owned(),
            MemoryEntry {
                etag: etag.to_owned(),
                value: value.to_vec(),
                stored_at: Instant::now(),
            },
        );
    }

    fn age(&self, key: &str) -> Option<Duration> {
        let buckets = self.buckets.lock().ok()?;
        let entry = buckets.get(&self.name)?.get(key)?;
        Some(entry.stored_at.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_bucket_set_and_get() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("browse");

        bucket.set("key", "etag1", b"view");

        assert_eq!(bucket.get("key", "etag1"), Some(b"view".to_vec()));
        assert_eq!(bucket.get("key", "etag2"), None);
        assert_eq!(bucket.get("key", ""), Some(b"view".to_vec()));
    }

    #[test]
    fn test_memory_buckets_share_storage_by_name() {
        let cache = MemoryCache::new();

        cache.bucket("browse").set("key", "etag", b"shared");

        assert_eq!(
            cache.bucket("browse").get("key", "etag"),
            Some(b"shared".to_vec())
        );
        assert_eq!(cache.bucket("children").get("key", "etag"), None);
    }

    #[test]
    fn test_memory_bucket_age() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("browse");

        assert_eq!(bucket.age("key"), None);

        bucket.set("key", "etag", b"view");
        let age = bucket.age("key").unwrap();
        assert!(age < Duration::from_secs(60));
    }
}
