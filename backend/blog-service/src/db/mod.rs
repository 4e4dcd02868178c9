/// Database access layer
///
/// - `PostRepository` / `UserRepository`: the seams services and the post list cache
///   depend on
/// - `PgPostRepository` / `PgUserRepository`: PostgreSQL implementations
/// - pool creation and embedded migrations
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{LikeToggle, Post, UpdatePostRequest, User};

pub mod like_repo;
pub mod post_repo;
pub mod user_repo;

pub use post_repo::PgPostRepository;
pub use user_repo::PgUserRepository;

/// Source of truth for posts and likes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Every post owned by `owner_id`, newest first. Empty when the user has none.
    async fn find_posts_by_owner(&self, owner_id: i64) -> Result<Vec<Post>>;

    async fn create_post(&self, owner_id: i64, title: &str, content: &str) -> Result<Post>;

    /// Page of all posts, newest first.
    async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>>;

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>>;

    /// Apply the provided fields; `None` leaves a field untouched.
    async fn update_post(
        &self,
        post_id: i64,
        changes: &UpdatePostRequest,
    ) -> Result<Option<Post>>;

    /// `false` when no such post existed.
    async fn delete_post(&self, post_id: i64) -> Result<bool>;

    /// Add the like when absent, remove it when present, adjusting the post's
    /// counter in the same transaction. `NotFound` when the post does not exist.
    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<LikeToggle>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Insert a user. Fails with `BadRequest` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;
}

/// Create the PostgreSQL pool and verify it with a bounded `SELECT 1`.
pub async fn create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, sqlx::Error> {
    debug!(
        "Creating database pool: max={}, min={}, acquire_timeout={}s, verify_timeout={}s",
        config.max_connections,
        config.min_connections,
        config.acquire_timeout_secs,
        config.connect_timeout_secs
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!("Database pool created and verified successfully");
            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Database pool verification failed");
            Err(e)
        }
        Err(_) => {
            error!(
                timeout_secs = config.connect_timeout_secs,
                "Database pool verification timed out"
            );
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

/// Apply the embedded migrations in `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// PostgreSQL unique-violation check, used to map duplicate inserts.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}
