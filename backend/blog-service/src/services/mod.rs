/// Business logic layer for blog-service
///
/// - Auth service: registration, login, token subject resolution
/// - Post service: post CRUD, like toggling, cached per-user listings
pub mod auth;
pub mod posts;

pub use auth::AuthService;
pub use posts::PostService;

use crate::error::{AppError, Result};

/// Reject values that pass length validation but contain only whitespace.
pub(crate) fn ensure_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{} must not be blank", field)));
    }
    Ok(())
}
