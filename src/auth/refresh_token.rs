/// Refresh Token Store
///
/// Long-lived opaque tokens backing session refresh. Tokens are 64-character
/// random strings from a CSPRNG, stored as SHA-256 digests (never in
/// plaintext) together with the owning user, an expiry, and a nullable
/// revocation timestamp. Revocation is monotone: once set, `revoked_at` is
/// never cleared or overwritten.
///
/// Every operation is a single SQL statement, so concurrent issue, resolve,
/// and revoke calls on different tokens contend only at the row level, and a
/// cancelled call never leaves a half-written row behind.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, RefreshTokenError};

/// Length of the plaintext token handed to clients. 64 alphanumeric
/// characters carry well over 256 bits of entropy.
const TOKEN_LENGTH: usize = 64;

/// Generate a new opaque refresh token.
///
/// The plaintext is what the client keeps; the server only ever stores its
/// digest.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Persist a freshly issued refresh token for a user.
///
/// The digest column is unique, so a (vanishingly unlikely) token collision
/// surfaces as a storage error instead of silently overwriting another
/// user's session.
pub async fn save_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    token: &str,
    expiry_seconds: i64,
) -> Result<(), AppError> {
    let token_hash = hash_token(token);
    let now = Utc::now();
    let expires_at = now + Duration::seconds(expiry_seconds);

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (token_hash, user_id, created_at, expires_at, revoked_at)
        VALUES ($1, $2, $3, $4, NULL)
        "#,
    )
    .bind(token_hash)
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Resolve a refresh token to its owning user id.
///
/// A token resolves iff it exists, has not been revoked, and has not
/// expired. The three failure kinds stay distinct here; the HTTP layer
/// collapses them into one opaque 401. Resolution never mutates state.
pub async fn resolve_refresh_token(pool: &PgPool, token: &str) -> Result<Uuid, AppError> {
    let token_hash = hash_token(token);

    let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>, Option<DateTime<Utc>>)>(
        r#"
        SELECT user_id, expires_at, revoked_at
        FROM refresh_tokens
        WHERE token_hash = $1
        "#,
    )
    .bind(&token_hash)
    .fetch_optional(pool)
    .await?;

    match row {
        None => {
            tracing::warn!("unknown refresh token presented");
            Err(RefreshTokenError::NotFound.into())
        }
        Some((user_id, expires_at, revoked_at)) => {
            if revoked_at.is_some() {
                tracing::warn!(user_id = %user_id, "revoked refresh token presented");
                return Err(RefreshTokenError::Revoked.into());
            }
            if expires_at <= Utc::now() {
                tracing::info!(user_id = %user_id, "expired refresh token presented");
                return Err(RefreshTokenError::Expired.into());
            }
            Ok(user_id)
        }
    }
}

/// Revoke a refresh token.
///
/// Idempotent: revoking an already-revoked token succeeds and keeps the
/// original revocation timestamp (COALESCE keeps the write monotone). Only a
/// token that never existed is an error.
pub async fn revoke_refresh_token(pool: &PgPool, token: &str) -> Result<(), AppError> {
    let token_hash = hash_token(token);

    let result = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked_at = COALESCE(revoked_at, $1)
        WHERE token_hash = $2
        "#,
    )
    .bind(Utc::now())
    .bind(token_hash)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RefreshTokenError::NotFound.into());
    }

    Ok(())
}
