/// Session Manager
///
/// Orchestrates the credential hasher, the access-token codec, and the
/// refresh-token store to answer login, refresh, revoke, and the per-request
/// authenticate guard. Refresh tokens follow `Active -> Revoked` or
/// `Active -> Expired`; neither transition is reversible. Access tokens are
/// never stored and a refresh never rotates the refresh token itself.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::jwt::{mint_access_token, verify_access_token};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::{
    generate_refresh_token, resolve_refresh_token, revoke_refresh_token, save_refresh_token,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

/// User identity as returned to a freshly logged-in caller.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_premium: bool,
}

/// The token pair handed out at login. The access token is stateless and
/// short-lived; the refresh token is the only persisted artifact.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authenticate an email/password pair and open a session.
///
/// The unknown-email and wrong-password paths both return
/// [`AuthError::InvalidCredentials`] with no distinguishing detail, and the
/// unknown-email path burns an equivalent Argon2id computation so the two
/// cannot be told apart by timing either.
pub async fn login(
    pool: &PgPool,
    auth: &AuthSettings,
    email: &str,
    password: &str,
) -> Result<(SessionUser, SessionTokens), AppError> {
    let row = sqlx::query_as::<_, (Uuid, String, String, DateTime<Utc>, DateTime<Utc>, bool)>(
        r#"
        SELECT id, email, hashed_password, created_at, updated_at, is_premium
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let (id, email, hashed_password, created_at, updated_at, is_premium) = match row {
        Some(row) => row,
        None => {
            // Equalize cost with the password-compare path
            let _ = hash_password(password);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    if !verify_password(password, &hashed_password)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let access_token = mint_access_token(&id, &auth.jwt_secret, auth.access_token_expiry)?;
    let refresh_token = generate_refresh_token();
    save_refresh_token(pool, id, &refresh_token, auth.refresh_token_expiry).await?;

    tracing::info!(user_id = %id, "session opened");

    Ok((
        SessionUser {
            id,
            email,
            created_at,
            updated_at,
            is_premium,
        },
        SessionTokens {
            access_token,
            refresh_token,
        },
    ))
}

/// Exchange a live refresh token for a fresh access token.
///
/// The refresh token itself is left untouched; it stays valid until it
/// expires or is revoked.
pub async fn refresh(pool: &PgPool, auth: &AuthSettings, token: &str) -> Result<String, AppError> {
    let user_id = resolve_refresh_token(pool, token).await?;
    mint_access_token(&user_id, &auth.jwt_secret, auth.access_token_expiry)
}

/// Revoke a refresh token, ending its session. Idempotent.
pub async fn revoke(pool: &PgPool, token: &str) -> Result<(), AppError> {
    revoke_refresh_token(pool, token).await
}

/// Per-request guard: verify a bearer access token and return the caller's
/// user id. Pure codec work, no storage access, safe at request frequency.
pub fn authenticate(token: &str, auth: &AuthSettings) -> Result<Uuid, AppError> {
    verify_access_token(token, &auth.jwt_secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 2_592_000,
            webhook_api_key: "test-key".to_string(),
        }
    }

    #[test]
    fn authenticate_accepts_tokens_it_minted() {
        let settings = test_settings();
        let user_id = Uuid::new_v4();
        let token = mint_access_token(&user_id, &settings.jwt_secret, 3600)
            .expect("Failed to mint token");

        assert_eq!(authenticate(&token, &settings).unwrap(), user_id);
    }

    #[test]
    fn authenticate_rejects_foreign_secrets() {
        let settings = test_settings();
        let token = mint_access_token(&Uuid::new_v4(), "another-secret-entirely", 3600)
            .expect("Failed to mint token");

        assert!(authenticate(&token, &settings).is_err());
    }
}
