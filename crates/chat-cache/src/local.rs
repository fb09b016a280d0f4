use async_trait::async_trait;
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, CacheResult};
use crate::store::{ensure_not_null, validate_key, CacheStore, CacheValue};

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    expires_at: Option<Instant>, // None = never
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }
}

/// Thread-safe in-process cache.
///
/// Values are kept as their concrete type, so a read with a different type
/// fails with `TypeMismatch` instead of converting. Expired entries are only
/// noticed, and dropped, by the next `try_get`/`contains_key` on that key;
/// nothing sweeps in the background.
#[derive(Clone)]
pub struct LocalCache {
    map: Arc<DashMap<String, Entry>>,
    default_ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl LocalCache {
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(default_ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        info!("Initializing local conversation cache (default ttl: {:?})", default_ttl);
        Self {
            map: Arc::new(DashMap::new()),
            default_ttl,
            clock,
        }
    }

    /// Physically stored entries, including expired ones nobody has read yet.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop `key` if it is still expired. A concurrent fresh write survives.
    fn evict_if_expired(&self, key: &str, now: Instant) {
        if self.map.remove_if(key, |_, e| e.is_expired(now)).is_some() {
            debug!("Key {} expired, removed from cache", key);
        }
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl CacheStore for LocalCache {
    async fn try_get<T: CacheValue>(&self, key: &str) -> CacheResult<Option<T>> {
        validate_key(key)?;
        let now = self.clock.now();

        let Some(entry) = self.map.get(key) else {
            return Ok(None);
        };

        if entry.is_expired(now) {
            drop(entry); // Release read lock
            self.evict_if_expired(key, now);
            return Ok(None);
        }

        let found = entry.type_name;
        let value = Arc::clone(&entry.value);
        drop(entry);

        match value.downcast::<T>() {
            Ok(v) => Ok(Some(T::clone(&v))),
            Err(_) => Err(CacheError::TypeMismatch {
                expected: type_name::<T>(),
                found,
            }),
        }
    }

    async fn set<T: CacheValue>(
        &self,
        key: &str,
        value: T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        validate_key(key)?;
        ensure_not_null(&value)?;

        let expires_at = ttl
            .or(self.default_ttl)
            .and_then(|ttl| self.clock.now().checked_add(ttl));

        self.map.insert(
            key.to_string(),
            Entry {
                value: Arc::new(value),
                type_name: type_name::<T>(),
                expires_at,
            },
        );
        debug!("Updated key {} in cache", key);
        Ok(())
    }

    async fn contains_key(&self, key: &str) -> CacheResult<bool> {
        validate_key(key)?;
        let now = self.clock.now();

        let expired = match self.map.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return Ok(false),
        };

        if expired {
            self.evict_if_expired(key, now);
        }
        Ok(!expired)
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        validate_key(key)?;
        self.map.remove(key);
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        let count = self.map.len();
        self.map.clear();
        info!("Cleared {} entries from local cache", count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Session {
        id: String,
        turns: Vec<String>,
    }

    fn session(id: &str) -> Session {
        Session {
            id: id.to_string(),
            turns: vec!["hello".to_string()],
        }
    }

    fn cache_with_clock(default_ttl: Option<Duration>) -> (LocalCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (LocalCache::with_clock(default_ttl, clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let cache = LocalCache::default();
        cache.set("s-1", session("s-1"), None).await.unwrap();

        let got = cache.get("s-1", session("other")).await.unwrap();
        assert_eq!(got, session("s-1"));
        assert!(cache.contains_key("s-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_key_returns_default() {
        let cache = LocalCache::default();

        let got = cache.get("x", "fallback".to_string()).await.unwrap();
        assert_eq!(got, "fallback");
        assert!(!cache.contains_key("x").await.unwrap());
        assert!(cache.try_get::<String>("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_then_get_returns_default() {
        let cache = LocalCache::default();
        cache.set("k", 42u32, None).await.unwrap();
        cache.remove("k").await.unwrap();

        assert_eq!(cache.get("k", 7u32).await.unwrap(), 7);

        // Removing again is a no-op
        cache.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_entry() {
        let cache = LocalCache::default();
        cache.set("k", "first".to_string(), None).await.unwrap();
        cache.set("k", "second".to_string(), None).await.unwrap();

        assert_eq!(cache.get("k", String::new()).await.unwrap(), "second");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_keys_rejected_everywhere() {
        let cache = LocalCache::default();

        assert!(matches!(cache.try_get::<u32>(" ").await, Err(CacheError::InvalidKey)));
        assert!(matches!(cache.get("", 1u32).await, Err(CacheError::InvalidKey)));
        assert!(matches!(cache.set("", 1u32, None).await, Err(CacheError::InvalidKey)));
        assert!(matches!(cache.contains_key("\n").await, Err(CacheError::InvalidKey)));
        assert!(matches!(cache.remove("").await, Err(CacheError::InvalidKey)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_null_value_rejected() {
        let cache = LocalCache::default();
        let result = cache.set::<Option<Session>>("k", None, None).await;

        assert!(matches!(result, Err(CacheError::InvalidValue)));
        assert!(!cache.contains_key("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_type_mismatch() {
        let cache = LocalCache::default();
        cache.set("k", "text".to_string(), None).await.unwrap();

        match cache.try_get::<Session>("k").await {
            Err(CacheError::TypeMismatch { expected, found }) => {
                assert!(expected.ends_with("Session"));
                assert!(found.ends_with("String"));
            }
            other => panic!("Expected TypeMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_explicit_ttl_expires_lazily() {
        let (cache, clock) = cache_with_clock(None);
        cache
            .set("k", session("k"), Some(Duration::from_secs(60)))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(59));
        assert!(cache.contains_key("k").await.unwrap());
        assert_eq!(cache.try_get::<Session>("k").await.unwrap(), Some(session("k")));

        clock.advance(Duration::from_secs(1));

        // Still physically present until something looks at it
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k", session("default")).await.unwrap(), session("default"));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_contains_key_evicts_expired_without_refreshing_live_entries() {
        let (cache, clock) = cache_with_clock(None);
        cache.set("k", 1u8, Some(Duration::from_secs(10))).await.unwrap();

        // Checking presence must not push the deadline out
        clock.advance(Duration::from_secs(5));
        assert!(cache.contains_key("k").await.unwrap());
        clock.advance(Duration::from_secs(5));
        assert!(!cache.contains_key("k").await.unwrap());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_default_ttl_applies_when_none_given() {
        let (cache, clock) = cache_with_clock(Some(Duration::from_secs(30)));
        cache.set("default", 1u8, None).await.unwrap();
        cache
            .set("explicit", 2u8, Some(Duration::from_secs(120)))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(31));
        assert!(!cache.contains_key("default").await.unwrap());
        assert!(cache.contains_key("explicit").await.unwrap());
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let (cache, clock) = cache_with_clock(None);
        cache.set("k", 1u8, None).await.unwrap();

        clock.advance(Duration::from_secs(60 * 60 * 24 * 365));
        assert_eq!(cache.get("k", 0u8).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_resets_expiration() {
        let (cache, clock) = cache_with_clock(Some(Duration::from_secs(10)));
        cache.set("k", 1u8, None).await.unwrap();
        clock.advance(Duration::from_secs(8));
        cache.set("k", 2u8, None).await.unwrap();
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get("k", 0u8).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = LocalCache::default();
        cache.set("a", 1u8, None).await.unwrap();
        cache.set("b", "two".to_string(), None).await.unwrap();

        cache.clear().await.unwrap();
        assert!(cache.is_empty());
        assert!(!cache.contains_key("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = LocalCache::default();
        let other = cache.clone();
        other.set("k", 5u8, None).await.unwrap();

        assert_eq!(cache.get("k", 0u8).await.unwrap(), 5);
    }
}
