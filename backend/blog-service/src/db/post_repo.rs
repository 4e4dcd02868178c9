use async_trait::async_trait;
use sqlx::PgPool;

use super::{like_repo, PostRepository};
use crate::error::Result;
use crate::models::{LikeToggle, Post, PostRow, UpdatePostRequest};

/// Post columns joined with the owner's username, shared by every read.
const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.created_at, p.owner_id,
           u.username AS owner_username, p.likes_count
    FROM posts p
    JOIN users u ON u.id = p.owner_id
"#;

/// PostgreSQL-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_posts_by_owner(&self, owner_id: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE p.owner_id = $1 ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn create_post(&self, owner_id: i64, title: &str, content: &str) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (title, content, owner_id)
                VALUES ($1, $2, $3)
                RETURNING id, title, content, created_at, owner_id, likes_count
            )
            SELECT i.id, i.title, i.content, i.created_at, i.owner_id,
                   u.username AS owner_username, i.likes_count
            FROM inserted i
            JOIN users u ON u.id = i.owner_id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} ORDER BY p.created_at DESC, p.id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Post::from))
    }

    async fn update_post(
        &self,
        post_id: i64,
        changes: &UpdatePostRequest,
    ) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            WITH updated AS (
                UPDATE posts
                SET title = COALESCE($2, title),
                    content = COALESCE($3, content)
                WHERE id = $1
                RETURNING id, title, content, created_at, owner_id, likes_count
            )
            SELECT d.id, d.title, d.content, d.created_at, d.owner_id,
                   u.username AS owner_username, d.likes_count
            FROM updated d
            JOIN users u ON u.id = d.owner_id
            "#,
        )
        .bind(post_id)
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<LikeToggle> {
        like_repo::toggle_like(&self.pool, post_id, user_id).await
    }
}
