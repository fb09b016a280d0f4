use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::config::{CacheOptions, CacheType};
use crate::error::CacheResult;
use crate::local::LocalCache;
use crate::redis::RedisCache;
use crate::store::{CacheStore, CacheValue};

/// Backend picked at startup. Built once and shared process-wide.
#[derive(Clone)]
pub enum Cache {
    Local(LocalCache),
    Shared(RedisCache),
}

impl Cache {
    pub async fn from_options(options: &CacheOptions) -> CacheResult<Self> {
        options.validate()?;

        let cache = match options.cache_type {
            CacheType::Local => Cache::Local(LocalCache::new(options.default_ttl())),
            CacheType::Shared => {
                let connection_string = options.connection_string.as_deref().unwrap_or_default();
                Cache::Shared(
                    RedisCache::connect(
                        connection_string,
                        options.default_ttl(),
                        options.operation_timeout(),
                    )
                    .await?,
                )
            }
        };

        info!(
            "Cache backend ready: {:?} (default ttl: {:?})",
            cache.kind(),
            options.default_ttl()
        );
        Ok(cache)
    }

    pub fn kind(&self) -> CacheType {
        match self {
            Cache::Local(_) => CacheType::Local,
            Cache::Shared(_) => CacheType::Shared,
        }
    }

    /// Backend reachability. Always fine for the local store.
    pub async fn ping(&self) -> CacheResult<()> {
        match self {
            Cache::Local(_) => Ok(()),
            Cache::Shared(c) => c.ping().await,
        }
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn try_get<T: CacheValue>(&self, key: &str) -> CacheResult<Option<T>> {
        match self {
            Cache::Local(c) => c.try_get(key).await,
            Cache::Shared(c) => c.try_get(key).await,
        }
    }

    async fn set<T: CacheValue>(
        &self,
        key: &str,
        value: T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        match self {
            Cache::Local(c) => c.set(key, value, ttl).await,
            Cache::Shared(c) => c.set(key, value, ttl).await,
        }
    }

    async fn contains_key(&self, key: &str) -> CacheResult<bool> {
        match self {
            Cache::Local(c) => c.contains_key(key).await,
            Cache::Shared(c) => c.contains_key(key).await,
        }
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        match self {
            Cache::Local(c) => c.remove(key).await,
            Cache::Shared(c) => c.remove(key).await,
        }
    }

    async fn clear(&self) -> CacheResult<()> {
        match self {
            Cache::Local(c) => c.clear().await,
            Cache::Shared(c) => c.clear().await,
        }
    }
}
