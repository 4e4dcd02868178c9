/// Auth service - registration, password login and token subject lookup
use std::sync::Arc;
use validator::Validate;

use super::ensure_not_blank;
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::models::{RegisterRequest, TokenResponse, User, UserSummary};
use crate::security::{hash_password, verify_password, Claims, JwtKeys, DUMMY_PASSWORD_HASH};

const BAD_LOGIN: &str = "Incorrect username or password";
const BAD_TOKEN: &str = "Could not validate credentials";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Create an account. Usernames are unique.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserSummary> {
        req.validate()?;
        ensure_not_blank("Username", &req.username)?;

        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::BadRequest(
                "Username already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&req.password)?;
        let user = self.users.create_user(&req.username, &password_hash).await?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");

        Ok(UserSummary::from(&user))
    }

    /// Exchange username and password for an access token.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let Some(user) = self.users.find_by_username(username).await? else {
            // Burn the same Argon2 work as a wrong password.
            let _ = verify_password(password, DUMMY_PASSWORD_HASH);
            tracing::debug!(username, "unknown username");
            return Err(AppError::Unauthorized(BAD_LOGIN.to_string()));
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(username, "password mismatch");
            return Err(AppError::Unauthorized(BAD_LOGIN.to_string()));
        }

        let token = self.keys.issue(&user.username)?;
        Ok(TokenResponse::bearer(token))
    }

    /// Load the user named by verified token claims.
    pub async fn resolve(&self, claims: &Claims) -> Result<User> {
        self.users
            .find_by_username(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized(BAD_TOKEN.to_string()))
    }
}
