/// User Routes
///
/// Registration and self-service credential update. Both are thin wrappers
/// around the credential hasher plus persistence; the update route is
/// guarded by the access-token codec.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{bearer_token, hash_password, session};
use crate::configuration::AuthSettings;
use crate::error::AppError;
use crate::validators::{is_valid_email, is_valid_password};

#[derive(Deserialize)]
pub struct UserCredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_premium: bool,
}

impl UserResponse {
    pub fn from_row(
        id: Uuid,
        email: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        is_premium: bool,
    ) -> Self {
        Self {
            id: id.to_string(),
            email,
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
            is_premium,
        }
    }
}

/// POST /api/users
///
/// Register a new user. Returns the created user without tokens; callers
/// log in separately.
///
/// # Errors
/// - 400: invalid email or password length
/// - 409: email already registered
/// - 500: hashing or storage failure
pub async fn create_user(
    form: web::Json<UserCredentialsRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let hashed_password = hash_password(&form.password)?;

    let user_id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO users (id, email, hashed_password, created_at, updated_at, is_premium)
        VALUES ($1, $2, $3, $4, $5, false)
        "#,
    )
    .bind(user_id)
    .bind(&email)
    .bind(&hashed_password)
    .bind(now)
    .bind(now)
    .execute(pool.get_ref())
    .await?;

    tracing::info!(user_id = %user_id, "user registered");

    Ok(HttpResponse::Created().json(UserResponse::from_row(user_id, email, now, now, false)))
}

/// PUT /api/users
///
/// Update the authenticated user's email and password. Identity comes from
/// the bearer access token, never from the body.
///
/// # Errors
/// - 400: invalid email or password length
/// - 401: missing or invalid access token
/// - 409: email taken by another user
pub async fn update_user(
    req: HttpRequest,
    form: web::Json<UserCredentialsRequest>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;
    let user_id = session::authenticate(token, auth.get_ref())?;

    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let hashed_password = hash_password(&form.password)?;

    let row = sqlx::query_as::<_, (DateTime<Utc>, DateTime<Utc>, bool)>(
        r#"
        UPDATE users
        SET email = $1, hashed_password = $2, updated_at = $3
        WHERE id = $4
        RETURNING created_at, updated_at, is_premium
        "#,
    )
    .bind(&email)
    .bind(&hashed_password)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(user_id = %user_id, "user credentials updated");

    Ok(HttpResponse::Ok().json(UserResponse::from_row(user_id, email, row.0, row.1, row.2)))
}
