/// Access Token Codec
///
/// Mints and verifies short-lived HS256 JWTs. Verification is fully
/// stateless: signature plus expiry decide validity, nothing is looked up.
/// The signing secret is injected by the caller; the algorithm is not.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::auth::claims::{Claims, ACCESS_TOKEN_ISSUER};
use crate::error::{AppError, AuthError, TokenError};

/// Mint a signed access token for a user.
///
/// Claims are exactly {issuer, subject, issued-at, expires-at}; see
/// [`Claims`]. Two tokens minted at different instants differ in `iat`, but
/// nothing relies on token-string uniqueness.
pub fn mint_access_token(
    user_id: &Uuid,
    secret: &str,
    expires_in_seconds: i64,
) -> Result<String, AppError> {
    let claims = Claims::new(user_id, expires_in_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token generation failed: {}", e)))
}

/// Verify an access token and return the subject user id.
///
/// Checks short-circuit in order: structural parse, signature, expiry,
/// issuer, subject format. Each failure carries its own [`TokenError`] kind;
/// no partial trust is granted on the way.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is a hard boundary, no clock leeway
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        let kind = match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed,
        };
        tracing::warn!(error = %e, "access token rejected");
        AppError::Auth(AuthError::Token(kind))
    })?;

    // Issuer checked after signature and expiry so each failure reports its
    // own kind
    if data.claims.iss != ACCESS_TOKEN_ISSUER {
        return Err(TokenError::WrongIssuer.into());
    }

    data.claims.user_id()
}
