use sqlx::PgPool;

use crate::error::{AppError, Result};
use crate::models::LikeToggle;

/// Toggle `user_id`'s like on `post_id`.
///
/// The post row is locked for the duration of the transaction, so concurrent toggles
/// on the same post serialize and the like row and `likes_count` always change together.
pub async fn toggle_like(pool: &PgPool, post_id: i64, user_id: i64) -> Result<LikeToggle> {
    let mut tx = pool.begin().await?;

    let locked: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?;

    if locked.is_none() {
        return Err(AppError::NotFound(format!("Post {} not found", post_id)));
    }

    let removed = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
        > 0;

    let liked = if removed {
        false
    } else {
        sqlx::query("INSERT INTO likes (post_id, user_id) VALUES ($1, $2)")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        true
    };

    let delta: i64 = if liked { 1 } else { -1 };
    let (likes_count,): (i64,) = sqlx::query_as(
        r#"
        UPDATE posts
        SET likes_count = likes_count + $2
        WHERE id = $1
        RETURNING likes_count
        "#,
    )
    .bind(post_id)
    .bind(delta)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(post_id, user_id, liked, likes_count, "like toggled");

    Ok(LikeToggle { liked, likes_count })
}

/// Whether `user_id` currently likes `post_id`.
pub async fn has_liked(pool: &PgPool, post_id: i64, user_id: i64) -> Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = $1 AND user_id = $2)",
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
