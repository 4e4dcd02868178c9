/// HTTP handlers for blog-service
///
/// - Auth: registration and password login (`/register`, `/token`)
/// - Posts: CRUD, likes and per-user listings
/// - Health: liveness and readiness probes
pub mod auth;
pub mod health;
pub mod posts;

use actix_web::{web, HttpResponse};

use crate::error::{AppError, Result};

// Re-export handler functions at module level
pub use auth::{register, token};
pub use posts::{
    create_post, delete_post, get_post, get_user_posts, like_post, list_posts, update_post,
};

/// Register the API routes and make extractor failures use the JSON error shape.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
    }))
    .app_data(web::FormConfig::default().error_handler(|err, _| {
        AppError::BadRequest(format!("Invalid form body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _| {
        AppError::NotFound(format!("Not found: {}", err)).into()
    }))
    .route("/register", web::post().to(register))
    .route("/token", web::post().to(token))
    .service(
        web::resource("/posts")
            .route(web::get().to(list_posts))
            .route(web::post().to(create_post)),
    )
    .service(
        web::resource("/post/{post_id}")
            .route(web::get().to(get_post))
            .route(web::put().to(update_post))
            .route(web::delete().to(delete_post)),
    )
    .route("/post/{post_id}/like", web::post().to(like_post))
    .route("/users/{user_id}/posts", web::get().to(get_user_posts));
}

/// 404 with the JSON error shape for unmatched routes.
pub async fn not_found() -> Result<HttpResponse> {
    Err(AppError::NotFound("Not found".to_string()))
}
