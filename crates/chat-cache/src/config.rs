use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CacheError, CacheResult};

/// Which backend holds the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    #[serde(alias = "in_memory")]
    Local,
    #[serde(alias = "redis")]
    Shared,
}

fn default_operation_timeout_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheOptions {
    #[serde(rename = "type")]
    pub cache_type: CacheType,

    /// Required for `shared`; comma-separated Redis URLs
    #[serde(default)]
    pub connection_string: Option<String>,

    /// Store-wide TTL applied when a write does not pass one
    #[serde(default)]
    pub expiration_seconds: Option<u64>,

    /// Upper bound for a single shared-backend round trip
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl CacheOptions {
    pub fn local(expiration_seconds: Option<u64>) -> Self {
        Self {
            cache_type: CacheType::Local,
            connection_string: None,
            expiration_seconds,
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.expiration_seconds.map(Duration::from_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn validate(&self) -> CacheResult<()> {
        if self.operation_timeout_ms == 0 {
            return Err(CacheError::Configuration(
                "cache.operation_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.cache_type == CacheType::Shared
            && self
                .connection_string
                .as_deref()
                .map_or(true, |s| s.trim().is_empty())
        {
            return Err(CacheError::Configuration(
                "cache.connection_string is required for the shared cache".to_string(),
            ));
        }

        Ok(())
    }
}
