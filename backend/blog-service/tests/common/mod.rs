//! In-memory stand-ins for PostgreSQL and flaky cache stores.

#![allow(dead_code)]

use async_trait::async_trait;
use blog_service::cache::{CacheError, CacheResult, CacheStore};
use blog_service::db::{PostRepository, UserRepository};
use blog_service::error::{AppError, Result};
use blog_service::models::{LikeToggle, Post, UpdatePostRequest, User, UserSummary};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct State {
    users: HashMap<i64, User>,
    posts: Vec<Post>,
    likes: HashSet<(i64, i64)>,
    next_user_id: i64,
    next_post_id: i64,
}

/// Users, posts and likes held in memory, implementing both repository traits.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    owner_queries: AtomicUsize,
    fail_reads: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find_posts_by_owner` calls so far.
    pub fn owner_queries(&self) -> usize {
        self.owner_queries.load(Ordering::SeqCst)
    }

    /// Make `find_posts_by_owner` fail like an unreachable database.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn add_user(&self, username: &str) -> User {
        let mut state = self.state.lock().unwrap();
        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            username: username.to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        user
    }

    pub fn insert_post(&self, owner_id: i64, title: &str, content: &str) -> Post {
        let mut state = self.state.lock().unwrap();
        let owner = state
            .users
            .get(&owner_id)
            .map(UserSummary::from)
            .expect("owner must exist");
        state.next_post_id += 1;
        let post = Post {
            id: state.next_post_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: Some(Utc::now()),
            owner,
            likes_count: 0,
        };
        state.posts.push(post.clone());
        post
    }

    pub fn like_rows(&self, post_id: i64) -> usize {
        let state = self.state.lock().unwrap();
        state.likes.iter().filter(|(p, _)| *p == post_id).count()
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    posts
}

#[async_trait]
impl PostRepository for FakeBackend {
    async fn find_posts_by_owner(&self, owner_id: i64) -> Result<Vec<Post>> {
        self.owner_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("connection refused".into()));
        }
        let state = self.state.lock().unwrap();
        let owned = state
            .posts
            .iter()
            .filter(|p| p.owner.id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(owned))
    }

    async fn create_post(&self, owner_id: i64, title: &str, content: &str) -> Result<Post> {
        Ok(self.insert_post(owner_id, title, content))
    }

    async fn list_posts(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        Ok(newest_first(state.posts.clone())
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn update_post(
        &self,
        post_id: i64,
        changes: &UpdatePostRequest,
    ) -> Result<Option<Post>> {
        let mut state = self.state.lock().unwrap();
        let Some(post) = state.posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            post.title = title.clone();
        }
        if let Some(content) = &changes.content {
            post.content = content.clone();
        }
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.posts.len();
        state.posts.retain(|p| p.id != post_id);
        state.likes.retain(|(p, _)| *p != post_id);
        Ok(state.posts.len() < before)
    }

    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<LikeToggle> {
        let mut state = self.state.lock().unwrap();
        if !state.posts.iter().any(|p| p.id == post_id) {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }
        let liked = if state.likes.remove(&(post_id, user_id)) {
            false
        } else {
            state.likes.insert((post_id, user_id));
            true
        };
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .expect("checked above");
        post.likes_count += if liked { 1 } else { -1 };
        Ok(LikeToggle {
            liked,
            likes_count: post.likes_count,
        })
    }
}

#[async_trait]
impl UserRepository for FakeBackend {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.username == username) {
            return Err(AppError::BadRequest("Username already registered".into()));
        }
        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// Cache store whose every operation fails, counting attempts.
#[derive(Default)]
pub struct UnreachableStore {
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

#[async_trait]
impl CacheStore for UnreachableStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    fn backend(&self) -> &'static str {
        "unreachable"
    }
}

/// Cache store that reads fine but refuses writes.
#[derive(Default)]
pub struct ReadOnlyStore;

#[async_trait]
impl CacheStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Unavailable("READONLY replica".into()))
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "read-only"
    }
}
