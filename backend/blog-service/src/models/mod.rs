/// Data models for blog-service
///
/// Row types (`*Row`, `User`) mirror the database; `Post` and `UserSummary` are the
/// JSON shapes shared by API responses and the post list cache.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod timestamp;

/// User account row. Never serialized: the password hash stays server-side.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user, also embedded as a post's `owner`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Post joined with its owner, as returned by the repository queries
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: i64,
    pub owner_username: String,
    pub likes_count: i64,
}

/// Post snapshot: the API response body and the element type of cached post lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    pub owner: UserSummary,
    #[serde(default)]
    pub likes_count: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: Some(row.created_at),
            owner: UserSummary {
                id: row.owner_id,
                username: row.owner_username,
            },
            likes_count: row.likes_count,
        }
    }
}

/// Outcome of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    /// `true` when the like was added, `false` when it was removed
    pub liked: bool,
    pub likes_count: i64,
}

// ============================================
// Request / response bodies
// ============================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Form body of `POST /token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: Option<String>,
}

/// Query string of `GET /posts`
#[derive(Debug, Clone, Deserialize)]
pub struct PostListQuery {
    #[serde(default)]
    pub step: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub detail: String,
    pub liked: bool,
    pub likes_count: i64,
}

impl From<LikeToggle> for LikeResponse {
    fn from(toggle: LikeToggle) -> Self {
        let detail = if toggle.liked {
            "Like added"
        } else {
            "Like removed"
        };
        Self {
            detail: detail.to_string(),
            liked: toggle.liked,
            likes_count: toggle.likes_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_post() -> Post {
        Post {
            id: 7,
            title: "Hello".into(),
            content: "First post".into(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
            owner: UserSummary {
                id: 55,
                username: "alice".into(),
            },
            likes_count: 3,
        }
    }

    #[test]
    fn post_wire_field_names() {
        let json = serde_json::to_value(sample_post()).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["title"], "Hello");
        assert_eq!(json["content"], "First post");
        assert_eq!(json["created_at"], "2024-05-01T10:00:00Z");
        assert_eq!(json["owner"]["id"], 55);
        assert_eq!(json["owner"]["username"], "alice");
        assert_eq!(json["likes_count"], 3);
        assert!(json["owner"].get("password_hash").is_none());
    }

    #[test]
    fn missing_likes_count_and_timestamp_default() {
        let post: Post = serde_json::from_str(
            r#"{"id": 1, "title": "t", "content": "c", "owner": {"id": 2, "username": "bob"}}"#,
        )
        .unwrap();

        assert_eq!(post.likes_count, 0);
        assert_eq!(post.created_at, None);
    }

    #[test]
    fn row_maps_to_snapshot() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let post = Post::from(PostRow {
            id: 1,
            title: "t".into(),
            content: "c".into(),
            created_at,
            owner_id: 9,
            owner_username: "carol".into(),
            likes_count: 0,
        });

        assert_eq!(post.owner, UserSummary { id: 9, username: "carol".into() });
        assert_eq!(post.created_at, Some(created_at));
    }

    #[test]
    fn like_response_detail() {
        let added = LikeResponse::from(LikeToggle { liked: true, likes_count: 1 });
        let removed = LikeResponse::from(LikeToggle { liked: false, likes_count: 0 });
        assert_eq!(added.detail, "Like added");
        assert_eq!(removed.detail, "Like removed");
    }

    #[test]
    fn register_validation() {
        let short = RegisterRequest {
            username: "al".into(),
            password: "long-enough".into(),
        };
        assert!(short.validate().is_err());

        let ok = RegisterRequest {
            username: "alice".into(),
            password: "long-enough".into(),
        };
        assert!(ok.validate().is_ok());
    }
}
