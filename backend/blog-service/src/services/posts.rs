/// Post service - post CRUD, likes and per-user listings
use std::sync::Arc;
use validator::Validate;

use super::ensure_not_blank;
use crate::cache::PostListCache;
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::models::{
    CreatePostRequest, LikeToggle, Post, PostListQuery, UpdatePostRequest, User,
};

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    post_lists: PostListCache,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, post_lists: PostListCache) -> Self {
        Self { repo, post_lists }
    }

    pub fn post_lists(&self) -> &PostListCache {
        &self.post_lists
    }

    /// Create a post owned by `owner`
    pub async fn create_post(&self, owner: &User, req: CreatePostRequest) -> Result<Post> {
        req.validate()?;
        ensure_not_blank("Title", &req.title)?;
        ensure_not_blank("Content", &req.content)?;

        let post = self
            .repo
            .create_post(owner.id, &req.title, &req.content)
            .await?;

        tracing::info!(post_id = post.id, owner_id = owner.id, "post created");
        Ok(post)
    }

    /// Page through all posts, newest first
    pub async fn list_posts(&self, query: &PostListQuery) -> Result<Vec<Post>> {
        if query.step < 0 {
            return Err(AppError::ValidationError(
                "step must not be negative".to_string(),
            ));
        }
        let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

        self.repo.list_posts(query.step, limit).await
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        self.repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| not_found(post_id))
    }

    /// Posts owned by `user_id`, served through the post list cache
    pub async fn posts_by_user(&self, user_id: i64) -> Result<Vec<Post>> {
        self.post_lists
            .get_posts_by_user(user_id, self.repo.as_ref())
            .await
    }

    /// Update title and/or content. Only the owner may edit.
    pub async fn update_post(
        &self,
        post_id: i64,
        caller: &User,
        changes: UpdatePostRequest,
    ) -> Result<Post> {
        changes.validate()?;
        if let Some(title) = &changes.title {
            ensure_not_blank("Title", title)?;
        }
        if let Some(content) = &changes.content {
            ensure_not_blank("Content", content)?;
        }

        self.ensure_owner(post_id, caller).await?;

        let post = self
            .repo
            .update_post(post_id, &changes)
            .await?
            .ok_or_else(|| not_found(post_id))?;

        tracing::info!(post_id, owner_id = caller.id, "post updated");
        Ok(post)
    }

    /// Delete a post. Only the owner may delete.
    pub async fn delete_post(&self, post_id: i64, caller: &User) -> Result<()> {
        self.ensure_owner(post_id, caller).await?;

        if !self.repo.delete_post(post_id).await? {
            return Err(not_found(post_id));
        }

        tracing::info!(post_id, owner_id = caller.id, "post deleted");
        Ok(())
    }

    /// Like the post if `caller` has not, otherwise remove the like
    pub async fn toggle_like(&self, post_id: i64, caller: &User) -> Result<LikeToggle> {
        self.repo.toggle_like(post_id, caller.id).await
    }

    async fn ensure_owner(&self, post_id: i64, caller: &User) -> Result<Post> {
        let post = self.get_post(post_id).await?;
        if post.owner.id != caller.id {
            tracing::debug!(post_id, caller_id = caller.id, "not the post owner");
            return Err(AppError::Forbidden(
                "Not enough permissions to modify this post".to_string(),
            ));
        }
        Ok(post)
    }
}

fn not_found(post_id: i64) -> AppError {
    AppError::NotFound(format!("Post {} not found", post_id))
}
