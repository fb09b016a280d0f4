use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::error::{CacheError, CacheResult};

/// Anything that can live in either backend: the local store keeps the
/// typed value, the shared store keeps its JSON text.
pub trait CacheValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Cache capability shared by every backend.
///
/// Expiration is backend-specific: the local store checks it lazily when an
/// entry is read, the shared store leaves it to the server.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stored value for `key`, or `None` when missing or expired.
    async fn try_get<T: CacheValue>(&self, key: &str) -> CacheResult<Option<T>>;

    /// Stored value for `key`, or `default` when missing or expired.
    async fn get<T: CacheValue>(&self, key: &str, default: T) -> CacheResult<T> {
        Ok(self.try_get(key).await?.unwrap_or(default))
    }

    /// Store `value` under `key`, replacing any existing entry.
    ///
    /// `ttl` wins over the store default; with neither the entry never expires.
    async fn set<T: CacheValue>(&self, key: &str, value: T, ttl: Option<Duration>)
        -> CacheResult<()>;

    /// True only for a present, unexpired entry. Never touches expiration.
    async fn contains_key(&self, key: &str) -> CacheResult<bool>;

    /// Delete `key`. Missing keys are not an error.
    async fn remove(&self, key: &str) -> CacheResult<()>;

    /// Delete every entry in the store.
    async fn clear(&self) -> CacheResult<()>;
}

pub(crate) fn validate_key(key: &str) -> CacheResult<()> {
    if key.trim().is_empty() {
        return Err(CacheError::InvalidKey);
    }
    Ok(())
}

/// Serialize `value` to JSON text, rejecting values that serialize to `null`.
pub(crate) fn to_json<T: Serialize>(value: &T) -> CacheResult<String> {
    let json = serde_json::to_value(value)
        .map_err(|e| CacheError::Serialization(e.to_string()))?;
    if json.is_null() {
        return Err(CacheError::InvalidValue);
    }
    Ok(json.to_string())
}

pub(crate) fn ensure_not_null<T: Serialize>(value: &T) -> CacheResult<()> {
    to_json(value).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("conversation-1").is_ok());
        assert!(matches!(validate_key(""), Err(CacheError::InvalidKey)));
        assert!(matches!(validate_key("  \t"), Err(CacheError::InvalidKey)));
    }

    #[test]
    fn test_null_values_rejected() {
        let none: Option<String> = None;
        assert!(matches!(ensure_not_null(&none), Err(CacheError::InvalidValue)));
        assert!(matches!(ensure_not_null(&()), Err(CacheError::InvalidValue)));

        // Empty content is still a value
        assert!(ensure_not_null(&String::new()).is_ok());
        assert!(ensure_not_null(&Some(0)).is_ok());
    }
}
