/// Access-token claims (RFC 7519 registered claims only).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, TokenError};

/// Fixed issuer tag for access tokens. Never configurable: a token minted by
/// any other issuer is rejected outright.
pub const ACCESS_TOKEN_ISSUER: &str = "chirpd-access";

/// Claims carried by an access token. This is the complete set; access
/// tokens are self-contained and never persisted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer, always [`ACCESS_TOKEN_ISSUER`]
    pub iss: String,
    /// Subject: owning user id as a UUID string
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: &Uuid, expires_in_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + expires_in_seconds,
        }
    }

    /// Extract the subject as a user id. A non-UUID subject means the token
    /// was never minted by us, so it counts as malformed.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed.into())
    }
}
