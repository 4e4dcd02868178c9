/// Blog Service Library
///
/// Posts, likes and accounts over HTTP, with a read-through Redis cache in front of the
/// "posts by user" listing.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Row types and JSON request/response bodies
/// - `services`: Business logic layer
/// - `db`: Repository traits and PostgreSQL implementations
/// - `cache`: Cache stores and the cache-aside post list read path
/// - `security`: Password hashing and access tokens
/// - `middleware`: Token verification and request metrics
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use services::{AuthService, PostService};

/// Request-scoped dependencies shared by every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub posts: PostService,
}

impl AppState {
    pub fn new(auth: AuthService, posts: PostService) -> Self {
        Self { auth, posts }
    }
}
