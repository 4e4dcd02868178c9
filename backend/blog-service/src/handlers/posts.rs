/// Post handlers - HTTP endpoints for post operations
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{
    CreatePostRequest, DetailResponse, LikeResponse, PostListQuery, UpdatePostRequest,
};
use crate::AppState;

/// Create a new post
pub async fn create_post(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = state.posts.create_post(&user, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// List posts, newest first
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> Result<HttpResponse> {
    let posts = state.posts.list_posts(&query).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Get a post by ID
pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post = state.posts.get_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Get the posts of one user (cached)
pub async fn get_user_posts(
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let posts = state.posts.posts_by_user(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Update a post owned by the caller
pub async fn update_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    CurrentUser(user): CurrentUser,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = state
        .posts
        .update_post(post_id.into_inner(), &user, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post owned by the caller
pub async fn delete_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    CurrentUser(user): CurrentUser,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    state.posts.delete_post(post_id, &user).await?;
    Ok(HttpResponse::Ok().json(DetailResponse {
        detail: format!("Post {} deleted", post_id),
    }))
}

/// Toggle the caller's like on a post
pub async fn like_post(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    CurrentUser(user): CurrentUser,
) -> Result<HttpResponse> {
    let toggle = state.posts.toggle_like(post_id.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(LikeResponse::from(toggle)))
}
