use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CacheError, CacheResult};
use crate::store::{to_json, validate_key, CacheStore, CacheValue};

/// Keys fetched per SCAN round trip during `clear`
const SCAN_BATCH: usize = 500;

#[derive(Clone)]
struct Endpoint {
    url: String, // redacted, for logs only
    connection: ConnectionManager,
}

/// Shared cache backed by Redis.
///
/// Values are stored as JSON strings. Expiration is delegated to Redis
/// (`PSETEX`), so entries disappear at their deadline whether or not anyone
/// reads them. Every round trip is bounded by `operation_timeout`; transport
/// failures and timeouts both surface as `BackendUnavailable`.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    endpoints: Vec<Endpoint>,
    default_ttl: Option<Duration>,
    operation_timeout: Duration,
}

impl RedisCache {
    /// Connect to every endpoint in `connection_string`.
    ///
    /// The connection string is a comma-separated list of Redis URLs
    /// (`redis://host:6379`); bare `host:port` entries get the `redis://`
    /// scheme. Data commands go to the first endpoint, `clear` visits all.
    pub async fn connect(
        connection_string: &str,
        default_ttl: Option<Duration>,
        operation_timeout: Duration,
    ) -> CacheResult<Self> {
        let urls = parse_endpoints(connection_string)?;
        let mut endpoints = Vec::with_capacity(urls.len());

        for url in urls {
            let redacted = redact_url(&url);
            let client = redis::Client::open(url.as_str()).map_err(|e| {
                CacheError::Configuration(format!("Invalid Redis URL {}: {}", redacted, e))
            })?;

            let connection = match tokio::time::timeout(
                operation_timeout,
                client.get_connection_manager(),
            )
            .await
            {
                Ok(Ok(conn)) => conn,
                Ok(Err(e)) => {
                    return Err(CacheError::BackendUnavailable(format!(
                        "Failed to connect to Redis at {}: {}",
                        redacted, e
                    )))
                }
                Err(_) => {
                    return Err(CacheError::BackendUnavailable(format!(
                        "Timed out connecting to Redis at {}",
                        redacted
                    )))
                }
            };

            info!("Connected to Redis at {}", redacted);
            endpoints.push(Endpoint {
                url: redacted,
                connection,
            });
        }

        let connection = endpoints
            .first()
            .map(|e| e.connection.clone())
            .ok_or_else(|| CacheError::Configuration("No Redis endpoint configured".to_string()))?;

        Ok(Self {
            connection,
            endpoints,
            default_ttl,
            operation_timeout,
        })
    }

    /// Round trip to the primary endpoint
    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let cmd = redis::cmd("PING");
        self.run("PING", cmd.query_async::<String>(&mut conn)).await?;
        Ok(())
    }

    async fn run<T, F>(&self, op: &'static str, fut: F) -> CacheResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::BackendUnavailable(format!(
                "Redis {} failed: {}",
                op, e
            ))),
            Err(_) => Err(CacheError::BackendUnavailable(format!(
                "Redis {} timed out after {:?}",
                op, self.operation_timeout
            ))),
        }
    }

    /// Enumerate the keys `endpoint` holds and delete them through the
    /// primary connection. Replicas only ever see SCAN.
    async fn clear_endpoint(&self, endpoint: &Endpoint) -> CacheResult<usize> {
        let mut scan_conn = endpoint.connection.clone();
        let mut primary = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut removed = 0;

        loop {
            let mut scan = redis::cmd("SCAN");
            scan.arg(cursor).arg("COUNT").arg(SCAN_BATCH);
            let (next, keys): (u64, Vec<String>) =
                self.run("SCAN", scan.query_async(&mut scan_conn)).await?;

            if !keys.is_empty() {
                removed += self.run("DEL", primary.del::<_, usize>(keys)).await?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn try_get<T: CacheValue>(&self, key: &str) -> CacheResult<Option<T>> {
        validate_key(key)?;
        let mut conn = self.connection.clone();

        let raw: Option<String> = self.run("GET", conn.get(key)).await?;
        let Some(text) = raw else {
            return Ok(None);
        };

        // A stored JSON `null` reads as a miss
        serde_json::from_str::<Option<T>>(&text)
            .map_err(|e| CacheError::Deserialization(format!("key {}: {}", key, e)))
    }

    async fn set<T: CacheValue>(
        &self,
        key: &str,
        value: T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        validate_key(key)?;
        let payload = to_json(&value)?;
        let mut conn = self.connection.clone();

        match ttl.or(self.default_ttl) {
            Some(ttl) => {
                // PSETEX rejects 0; the smallest deadline Redis accepts is 1ms
                let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                self.run("PSETEX", conn.pset_ex::<_, _, ()>(key, payload, millis))
                    .await?;
            }
            None => {
                self.run("SET", conn.set::<_, _, ()>(key, payload)).await?;
            }
        }

        debug!("Updated key {} in Redis", key);
        Ok(())
    }

    async fn contains_key(&self, key: &str) -> CacheResult<bool> {
        validate_key(key)?;
        let mut conn = self.connection.clone();
        self.run("EXISTS", conn.exists::<_, bool>(key)).await
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        validate_key(key)?;
        let mut conn = self.connection.clone();
        self.run("DEL", conn.del::<_, ()>(key)).await
    }

    /// Not atomic: writers racing with `clear` may leave keys behind.
    /// Keys found on any endpoint are deleted on the primary.
    async fn clear(&self) -> CacheResult<()> {
        let mut first_error = None;

        for endpoint in &self.endpoints {
            match self.clear_endpoint(endpoint).await {
                Ok(removed) => info!("Cleared {} keys found on {}", removed, endpoint.url),
                Err(e) => {
                    warn!("Failed to clear keys on {}: {}", endpoint.url, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn parse_endpoints(connection_string: &str) -> CacheResult<Vec<String>> {
    let urls: Vec<String> = connection_string
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.contains("://") {
                s.to_string()
            } else {
                format!("redis://{}", s)
            }
        })
        .collect();

    if urls.is_empty() {
        return Err(CacheError::Configuration(
            "Redis connection string is empty".to_string(),
        ));
    }
    Ok(urls)
}

/// Strip credentials so URLs can be logged
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
