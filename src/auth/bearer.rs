/// Credential extraction from the Authorization header.
///
/// The bearer format is fixed: the header value must be exactly
/// `"Bearer " + token`. Anything else (absent header, wrong scheme, empty or
/// space-containing token) is a missing credential and never reaches the
/// token codec or the refresh-token store.

use actix_web::http::header::{self, HeaderMap};

use crate::error::{AppError, AuthError};

/// Extract a bearer token from the request headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    scheme_token(headers, "Bearer ")
}

/// Extract a webhook API key, scheme `ApiKey <key>`.
pub fn api_key(headers: &HeaderMap) -> Result<&str, AppError> {
    scheme_token(headers, "ApiKey ")
}

fn scheme_token<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MissingCredential)?;

    let token = value
        .strip_prefix(scheme)
        .ok_or(AuthError::MissingCredential)?;

    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MissingCredential.into());
    }

    Ok(token)
}
