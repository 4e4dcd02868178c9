/// Auth handlers - account registration and token issuing
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::{RegisterRequest, TokenRequest};
use crate::AppState;

/// Register a new account
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let user = state.auth.register(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Exchange form-encoded credentials for a bearer token
pub async fn token(
    state: web::Data<AppState>,
    form: web::Form<TokenRequest>,
) -> Result<HttpResponse> {
    let token = state.auth.login(&form.username, &form.password).await?;
    Ok(HttpResponse::Ok().json(token))
}
