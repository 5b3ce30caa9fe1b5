/// Chirp Routes
///
/// Short-message CRUD. Mutations require a valid access token (the
/// stateless guard); reads are public.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{bearer_token, session};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::validators::clean_chirp_body;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Serialize)]
pub struct ChirpResponse {
    pub id: String,
    pub body: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ChirpResponse {
    fn from_row(
        id: Uuid,
        body: String,
        user_id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.to_string(),
            body,
            user_id: user_id.to_string(),
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
        }
    }
}

/// POST /api/chirps
///
/// Create a chirp owned by the authenticated user. The body is limited to
/// 140 characters and run through the profanity filter before storage.
pub async fn create_chirp(
    req: HttpRequest,
    form: web::Json<CreateChirpRequest>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;
    let user_id = session::authenticate(token, auth.get_ref())?;

    let body = clean_chirp_body(&form.body)?;

    let chirp_id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO chirps (id, body, user_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(chirp_id)
    .bind(&body)
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(ChirpResponse::from_row(chirp_id, body, user_id, now, now)))
}

/// GET /api/chirps
///
/// All chirps, oldest first. Public.
pub async fn list_chirps(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let rows = sqlx::query_as::<_, (Uuid, String, Uuid, DateTime<Utc>, DateTime<Utc>)>(
        r#"
        SELECT id, body, user_id, created_at, updated_at
        FROM chirps
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    let chirps: Vec<ChirpResponse> = rows
        .into_iter()
        .map(|(id, body, user_id, created_at, updated_at)| {
            ChirpResponse::from_row(id, body, user_id, created_at, updated_at)
        })
        .collect();

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{id}
pub async fn get_chirp(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = path.into_inner();

    let row = sqlx::query_as::<_, (Uuid, String, Uuid, DateTime<Utc>, DateTime<Utc>)>(
        r#"
        SELECT id, body, user_id, created_at, updated_at
        FROM chirps
        WHERE id = $1
        "#,
    )
    .bind(chirp_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| DatabaseError::NotFound("chirp not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ChirpResponse::from_row(row.0, row.1, row.2, row.3, row.4)))
}

/// DELETE /api/chirps/{id}
///
/// Only the chirp's author may delete it.
///
/// # Errors
/// - 401: missing or invalid access token
/// - 403: authenticated user is not the author
/// - 404: no such chirp
pub async fn delete_chirp(
    req: HttpRequest,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(req.headers())?;
    let user_id = session::authenticate(token, auth.get_ref())?;
    let chirp_id = path.into_inner();

    let (author_id,) = sqlx::query_as::<_, (Uuid,)>("SELECT user_id FROM chirps WHERE id = $1")
        .bind(chirp_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| DatabaseError::NotFound("chirp not found".to_string()))?;

    if author_id != user_id {
        return Err(AuthError::Forbidden.into());
    }

    sqlx::query("DELETE FROM chirps WHERE id = $1")
        .bind(chirp_id)
        .execute(pool.get_ref())
        .await?;

    tracing::info!(chirp_id = %chirp_id, user_id = %user_id, "chirp deleted");

    Ok(HttpResponse::NoContent().finish())
}
