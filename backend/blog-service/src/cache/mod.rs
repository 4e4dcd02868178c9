/// Post list caching layer
///
/// - `CacheStore`: key/value store with per-write TTL (Redis or in-process)
/// - `PostListCache`: cache-aside read path for "posts owned by user X"
///
/// Cache failures never fail a request. They are logged and the read falls through to
/// PostgreSQL.
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{CacheBackend, CacheConfig};

pub mod memory_store;
pub mod post_list;
pub mod redis_store;

pub use memory_store::{Clock, InMemoryCacheStore, ManualClock, SystemClock};
pub use post_list::PostListCache;
pub use redis_store::RedisCacheStore;

/// Lifetime of a cached post list, in seconds
pub const POST_LIST_TTL_SECS: u64 = 600;

/// Cache key for the posts owned by `user_id`: the bare decimal id.
pub fn post_list_key(user_id: i64) -> String {
    user_id.to_string()
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Text key/value store with TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stored value, or `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous entry, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Round-trip used by readiness checks.
    async fn ping(&self) -> CacheResult<()>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Build the configured cache store.
///
/// A Redis server that cannot be reached at startup leaves the service running without
/// a cache rather than refusing to start.
pub async fn build_store(config: &CacheConfig) -> Option<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::Disabled => {
            info!("Post list cache disabled");
            None
        }
        CacheBackend::Memory => {
            info!("Using in-process post list cache");
            Some(Arc::new(InMemoryCacheStore::new()))
        }
        CacheBackend::Redis => {
            let url = config.redis_url.as_deref()?;
            match RedisCacheStore::connect(url).await {
                Ok(store) => {
                    info!("Using Redis post list cache");
                    Some(Arc::new(store))
                }
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, post list cache disabled");
                    None
                }
            }
        }
    }
}
