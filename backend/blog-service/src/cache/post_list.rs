use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{post_list_key, CacheStore, POST_LIST_TTL_SECS};
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::metrics::post_cache::{
    POST_LIST_CACHE_EVENTS, POST_LIST_CACHE_WRITE_TOTAL, POST_LIST_REPOSITORY_FETCH_SECONDS,
};
use crate::models::Post;

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(250);

/// Read-through cache for "posts owned by user X".
///
/// The cache is probed first; only a miss (absent, unreadable, erroring or slow entry)
/// reaches the repository, after which the fetched list is written back with a fixed TTL.
/// Entries are never invalidated on writes, so a cached list may lag behind PostgreSQL by
/// up to one TTL.
#[derive(Clone)]
pub struct PostListCache {
    store: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
    op_timeout: Duration,
}

impl PostListCache {
    pub fn new(store: Option<Arc<dyn CacheStore>>, ttl: Duration, op_timeout: Duration) -> Self {
        Self {
            store,
            ttl,
            op_timeout,
        }
    }

    /// Cache with the default 600s TTL.
    pub fn with_store(store: Arc<dyn CacheStore>) -> Self {
        Self::new(
            Some(store),
            Duration::from_secs(POST_LIST_TTL_SECS),
            DEFAULT_OP_TIMEOUT,
        )
    }

    /// Repository-only reads.
    pub fn disabled() -> Self {
        Self::new(
            None,
            Duration::from_secs(POST_LIST_TTL_SECS),
            DEFAULT_OP_TIMEOUT,
        )
    }

    pub fn store(&self) -> Option<&Arc<dyn CacheStore>> {
        self.store.as_ref()
    }

    /// Posts owned by `user_id`, from the cache when possible.
    ///
    /// Cache failures degrade to a repository read; repository failures are returned.
    pub async fn get_posts_by_user(
        &self,
        user_id: i64,
        repository: &dyn PostRepository,
    ) -> Result<Vec<Post>> {
        if user_id <= 0 {
            return Err(AppError::ValidationError(format!(
                "user_id must be a positive integer (got {})",
                user_id
            )));
        }

        let key = post_list_key(user_id);

        if let Some(store) = &self.store {
            if let Some(posts) = self.probe(store.as_ref(), &key).await {
                return Ok(posts);
            }
        }

        let timer = POST_LIST_REPOSITORY_FETCH_SECONDS.start_timer();
        let posts = repository.find_posts_by_owner(user_id).await?;
        timer.observe_duration();

        if let Some(store) = &self.store {
            self.populate(store.as_ref(), &key, &posts).await;
        }

        Ok(posts)
    }

    async fn probe(&self, store: &dyn CacheStore, key: &str) -> Option<Vec<Post>> {
        match timeout(self.op_timeout, store.get(key)).await {
            Ok(Ok(Some(text))) if !text.is_empty() => {
                match serde_json::from_str::<Vec<Post>>(&text) {
                    Ok(posts) => {
                        debug!(key, count = posts.len(), "Post list cache HIT");
                        POST_LIST_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                        Some(posts)
                    }
                    Err(e) => {
                        warn!(key, error = %e, "Unreadable post list cache entry, treating as miss");
                        POST_LIST_CACHE_EVENTS.with_label_values(&["corrupt"]).inc();
                        None
                    }
                }
            }
            Ok(Ok(_)) => {
                debug!(key, "Post list cache MISS");
                POST_LIST_CACHE_EVENTS.with_label_values(&["miss"]).inc();
                None
            }
            Ok(Err(e)) => {
                warn!(
                    key,
                    backend = store.backend(),
                    error = %e,
                    "Post list cache read failed, falling back to database"
                );
                POST_LIST_CACHE_EVENTS.with_label_values(&["error"]).inc();
                None
            }
            Err(_) => {
                warn!(
                    key,
                    backend = store.backend(),
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "Post list cache read timed out, falling back to database"
                );
                POST_LIST_CACHE_EVENTS.with_label_values(&["timeout"]).inc();
                None
            }
        }
    }

    async fn populate(&self, store: &dyn CacheStore, key: &str, posts: &[Post]) {
        let payload = match serde_json::to_string(posts) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize post list for cache");
                POST_LIST_CACHE_WRITE_TOTAL.with_label_values(&["error"]).inc();
                return;
            }
        };

        match timeout(self.op_timeout, store.set(key, &payload, self.ttl)).await {
            Ok(Ok(())) => {
                debug!(
                    key,
                    count = posts.len(),
                    ttl_secs = self.ttl.as_secs(),
                    "Post list cache WRITE"
                );
                POST_LIST_CACHE_WRITE_TOTAL
                    .with_label_values(&["success"])
                    .inc();
            }
            Ok(Err(e)) => {
                warn!(key, backend = store.backend(), error = %e, "Post list cache write failed");
                POST_LIST_CACHE_WRITE_TOTAL.with_label_values(&["error"]).inc();
            }
            Err(_) => {
                warn!(key, backend = store.backend(), "Post list cache write timed out");
                POST_LIST_CACHE_WRITE_TOTAL.with_label_values(&["error"]).inc();
            }
        }
    }
}
