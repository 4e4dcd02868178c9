/// HTTP client for the blog API
///
/// Every call maps the response onto `ApiError`, so handlers only decide what to tell the
/// user. Bodies of failed requests are expected to carry `{"detail": ...}`.
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from the API, with its detail message
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("API returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
}

/// Account as returned by `POST /register`
pub type NewUser = Author;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub owner: Author,
    #[serde(default)]
    pub likes_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeResponse {
    pub detail: String,
    pub liked: bool,
    pub likes_count: i64,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct NewPost<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct PostChanges<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.bearer_auth(token)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<NewUser, ApiError> {
        let resp = self
            .http
            .post(self.url("/register"))
            .json(&Credentials { username, password })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let resp = self
            .http
            .post(self.url("/token"))
            .form(&Credentials { username, password })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let resp = self.http.get(self.url("/posts")).send().await?;
        decode(resp).await
    }

    pub async fn create_post(
        &self,
        token: &str,
        title: &str,
        content: &str,
    ) -> Result<Post, ApiError> {
        let resp = self
            .authed(self.http.post(self.url("/posts")), token)
            .json(&NewPost { title, content })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn update_post(
        &self,
        token: &str,
        post_id: i64,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Post, ApiError> {
        let resp = self
            .authed(self.http.put(self.url(&format!("/post/{}", post_id))), token)
            .json(&PostChanges { title, content })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete_post(&self, token: &str, post_id: i64) -> Result<(), ApiError> {
        let resp = self
            .authed(self.http.delete(self.url(&format!("/post/{}", post_id))), token)
            .send()
            .await?;
        decode::<serde_json::Value>(resp).await.map(|_| ())
    }

    pub async fn like_post(&self, token: &str, post_id: i64) -> Result<LikeResponse, ApiError> {
        let resp = self
            .authed(
                self.http.post(self.url(&format!("/post/{}/like", post_id))),
                token,
            )
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }

    let detail = error_detail(status, &body);
    tracing::debug!(status = status.as_u16(), %detail, "API request failed");

    if status == StatusCode::UNAUTHORIZED {
        Err(ApiError::Unauthorized(detail))
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}

/// `detail` from an error body, or the status reason when the body has none.
fn error_detail(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body).map(|b| b.detail) {
        Ok(serde_json::Value::String(detail)) => detail,
        Ok(other) if !other.is_null() => other.to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_from_json_body() {
        assert_eq!(
            error_detail(
                StatusCode::BAD_REQUEST,
                r#"{"detail":"Username already registered","status":400}"#
            ),
            "Username already registered"
        );
    }

    #[test]
    fn detail_falls_back_to_reason() {
        assert_eq!(
            error_detail(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "Bad Gateway"
        );
    }

    #[test]
    fn structured_detail_is_stringified() {
        let detail = error_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"msg":"field required"}]}"#,
        );
        assert!(detail.contains("field required"));
    }
}
