//! Conversation cache
//!
//! Key-value storage for chat state with optional per-entry expiration and
//! two interchangeable backends:
//! - `LocalCache`: in-process DashMap, lazy expiration on access
//! - `RedisCache`: shared Redis deployment, native (active) TTL
//!
//! The backend is chosen once at startup from `CacheOptions` and wrapped in
//! the `Cache` enum, which is what callers hold.

mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod local;
pub mod redis;
pub mod store;

pub use backend::Cache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheOptions, CacheType};
pub use error::{CacheError, CacheResult};
pub use local::LocalCache;
pub use self::redis::RedisCache;
pub use store::{CacheStore, CacheValue};
