//! Post list cache behavior against in-memory stores.
//!
//! Coverage:
//! - hit short-circuits the repository
//! - miss reads the repository and populates the cache
//! - snapshot serialization round-trips
//! - empty lists are cached
//! - TTL expiry (manual clock)
//! - cache read/write failures and corrupt entries degrade to the repository

mod common;

use blog_service::cache::{
    post_list_key, CacheStore, InMemoryCacheStore, ManualClock, PostListCache, POST_LIST_TTL_SECS,
};
use blog_service::error::AppError;
use blog_service::models::{Post, UserSummary};
use chrono::{TimeZone, Utc};
use common::{FakeBackend, ReadOnlyStore, UnreachableStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(POST_LIST_TTL_SECS);

fn cache_with(store: Arc<dyn CacheStore>) -> PostListCache {
    PostListCache::new(Some(store), TTL, Duration::from_millis(250))
}

fn snapshot(id: i64, owner_id: i64) -> Post {
    Post {
        id,
        title: format!("Post {id}"),
        content: "Lorem ipsum".into(),
        created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
        owner: UserSummary {
            id: owner_id,
            username: format!("user{owner_id}"),
        },
        likes_count: 2,
    }
}

#[tokio::test]
async fn test_cache_hit_skips_repository() {
    let store = Arc::new(InMemoryCacheStore::new());
    let cached = vec![snapshot(1, 55)];
    store
        .set("55", &serde_json::to_string(&cached).unwrap(), TTL)
        .await
        .unwrap();

    let repo = FakeBackend::new();
    let posts = cache_with(store)
        .get_posts_by_user(55, &repo)
        .await
        .unwrap();

    assert_eq!(posts, cached);
    assert_eq!(repo.owner_queries(), 0);
}

#[tokio::test]
async fn test_cache_miss_populates_from_repository() {
    let repo = FakeBackend::new();
    let _filler: Vec<_> = (0..55).map(|i| repo.add_user(&format!("filler{i}"))).collect();
    let owner = repo.add_user("user56");
    assert_eq!(owner.id, 56);
    let older = repo.insert_post(owner.id, "first", "one");
    let newer = repo.insert_post(owner.id, "second", "two");

    let store = Arc::new(InMemoryCacheStore::new());
    let cache = cache_with(store.clone());

    assert_eq!(store.get("56").await.unwrap(), None);
    let posts = cache.get_posts_by_user(56, &repo).await.unwrap();

    assert_eq!(repo.owner_queries(), 1);
    assert_eq!(
        posts.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![newer.id, older.id]
    );

    let raw = store.get(&post_list_key(56)).await.unwrap().expect("entry written");
    let stored: Vec<Post> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, posts);

    let again = cache.get_posts_by_user(56, &repo).await.unwrap();
    assert_eq!(again, posts);
    assert_eq!(repo.owner_queries(), 1);
}

#[test]
fn test_snapshot_round_trip() {
    let posts = vec![
        snapshot(1, 3),
        Post {
            created_at: None,
            likes_count: 0,
            ..snapshot(2, 3)
        },
    ];

    let text = serde_json::to_string(&posts).unwrap();
    let decoded: Vec<Post> = serde_json::from_str(&text).unwrap();

    assert_eq!(decoded, posts);
}

#[test]
fn test_reads_entries_with_naive_timestamps() {
    let text = r#"[{"id": 1, "title": "t", "content": "c",
                    "created_at": "2024-05-01T10:00:00.250000",
                    "owner": {"id": 3, "username": "carol"}, "likes_count": 4}]"#;

    let decoded: Vec<Post> = serde_json::from_str(text).unwrap();

    assert_eq!(
        decoded[0].created_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + chrono::Duration::milliseconds(250))
    );
    assert_eq!(decoded[0].likes_count, 4);
}

#[tokio::test]
async fn test_empty_result_is_cached() {
    let repo = FakeBackend::new();
    let user = repo.add_user("quiet");
    let store = Arc::new(InMemoryCacheStore::new());
    let cache = cache_with(store.clone());

    assert!(cache.get_posts_by_user(user.id, &repo).await.unwrap().is_empty());
    assert_eq!(
        store.get(&post_list_key(user.id)).await.unwrap().as_deref(),
        Some("[]")
    );

    assert!(cache.get_posts_by_user(user.id, &repo).await.unwrap().is_empty());
    assert_eq!(repo.owner_queries(), 1);
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let repo = FakeBackend::new();
    let user = repo.add_user("writer");
    repo.insert_post(user.id, "hello", "world");

    let clock = Arc::new(ManualClock::new());
    let store = Arc::new(InMemoryCacheStore::with_clock(clock.clone()));
    let cache = cache_with(store);

    cache.get_posts_by_user(user.id, &repo).await.unwrap();
    assert_eq!(repo.owner_queries(), 1);

    clock.advance(TTL - Duration::from_secs(1));
    cache.get_posts_by_user(user.id, &repo).await.unwrap();
    assert_eq!(repo.owner_queries(), 1, "still fresh one second before expiry");

    clock.advance(Duration::from_secs(1));
    cache.get_posts_by_user(user.id, &repo).await.unwrap();
    assert_eq!(repo.owner_queries(), 2, "expired entry is a miss");
}

#[tokio::test]
async fn test_stale_within_ttl_after_new_post() {
    let repo = FakeBackend::new();
    let user = repo.add_user("writer");
    repo.insert_post(user.id, "one", "1");

    let cache = cache_with(Arc::new(InMemoryCacheStore::new()));
    assert_eq!(cache.get_posts_by_user(user.id, &repo).await.unwrap().len(), 1);

    repo.insert_post(user.id, "two", "2");
    assert_eq!(cache.get_posts_by_user(user.id, &repo).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreachable_cache_falls_back_to_repository() {
    let repo = FakeBackend::new();
    let user = repo.add_user("writer");
    let post = repo.insert_post(user.id, "hello", "world");

    let store = Arc::new(UnreachableStore::default());
    let cache = cache_with(store.clone());

    let posts = cache.get_posts_by_user(user.id, &repo).await.unwrap();

    assert_eq!(posts, vec![post]);
    assert_eq!(store.gets.load(Ordering::SeqCst), 1);
    assert_eq!(store.sets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_write_failure_is_not_surfaced() {
    let repo = FakeBackend::new();
    let user = repo.add_user("writer");
    repo.insert_post(user.id, "hello", "world");

    let cache = cache_with(Arc::new(ReadOnlyStore));
    let posts = cache.get_posts_by_user(user.id, &repo).await.unwrap();

    assert_eq!(posts.len(), 1);
}

#[tokio::test]
async fn test_corrupt_entry_is_replaced() {
    let repo = FakeBackend::new();
    let user = repo.add_user("writer");
    let post = repo.insert_post(user.id, "hello", "world");

    let store = Arc::new(InMemoryCacheStore::new());
    let key = post_list_key(user.id);
    store.set(&key, "{not json", TTL).await.unwrap();

    let cache = cache_with(store.clone());
    let posts = cache.get_posts_by_user(user.id, &repo).await.unwrap();

    assert_eq!(posts, vec![post]);
    let raw = store.get(&key).await.unwrap().unwrap();
    assert_eq!(serde_json::from_str::<Vec<Post>>(&raw).unwrap(), posts);
}

#[tokio::test]
async fn test_empty_string_entry_is_a_miss() {
    let repo = FakeBackend::new();
    let user = repo.add_user("writer");

    let store = Arc::new(InMemoryCacheStore::new());
    store.set(&post_list_key(user.id), "", TTL).await.unwrap();

    cache_with(store).get_posts_by_user(user.id, &repo).await.unwrap();
    assert_eq!(repo.owner_queries(), 1);
}

#[tokio::test]
async fn test_repository_failure_is_returned_and_nothing_cached() {
    let repo = FakeBackend::new();
    let user = repo.add_user("writer");
    repo.fail_reads(true);

    let store = Arc::new(InMemoryCacheStore::new());
    let err = cache_with(store.clone())
        .get_posts_by_user(user.id, &repo)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DatabaseError(_)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_concurrent_misses_agree() {
    let repo = Arc::new(FakeBackend::new());
    let user_id = repo.add_user("writer").id;
    repo.insert_post(user_id, "hello", "world");

    let cache = cache_with(Arc::new(InMemoryCacheStore::new()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            let repo = repo.clone();
            tokio::spawn(async move { cache.get_posts_by_user(user_id, repo.as_ref()).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert!(repo.owner_queries() >= 1);
}
