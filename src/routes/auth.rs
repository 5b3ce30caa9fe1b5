/// Session Routes
///
/// Login, access-token refresh, and refresh-token revocation. All
/// orchestration lives in [`crate::auth::session`]; these handlers only
/// shape requests and responses.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{bearer_token, session};
use crate::configuration::AuthSettings;
use crate::error::AppError;
use crate::routes::users::UserResponse;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// Authenticate with email and password; returns the user plus a fresh
/// access/refresh token pair.
///
/// # Security Notes
/// - Unknown email and wrong password produce the same 401 response
/// - The access token is never persisted; only the refresh token is
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let (user, tokens) = session::login(pool.get_ref(), auth.get_ref(), &form.email, &form.password)
        .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from_row(
            user.id,
            user.email,
            user.created_at,
            user.updated_at,
            user.is_premium,
        ),
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Exchange a bearer refresh token for a new one-hour access token. The
/// refresh token is not rotated.
///
/// # Errors
/// - 401: header malformed, or token unknown / expired / revoked
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;
    let access_token = session::refresh(pool.get_ref(), auth.get_ref(), token).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        token: access_token,
    }))
}

/// POST /api/revoke
///
/// Revoke the presented bearer refresh token. Responds 204 whether or not
/// the token was already revoked; only a never-issued token fails.
pub async fn revoke(req: HttpRequest, pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;
    session::revoke(pool.get_ref(), token).await?;

    Ok(HttpResponse::NoContent().finish())
}
