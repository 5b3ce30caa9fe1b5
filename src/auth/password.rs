/// Password Hashing and Verification
///
/// Argon2id with the crate's default cost parameters and a fresh random salt
/// per hash. The output is a self-describing PHC string, so verification
/// never needs the parameters stored anywhere else.

use argon2::password_hash::{
    rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
    PasswordVerifier, SaltString,
};
use argon2::Argon2;

use crate::error::{AppError, AuthError};

/// Hash a password with Argon2id.
///
/// # Errors
/// Fails only on internal hasher failure, which is surfaced as an internal
/// error and should be unreachable in practice.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Auth(AuthError::Hashing(e.to_string())))
}

/// Verify a password against a stored PHC hash string.
///
/// Returns `Ok(false)` on a clean mismatch. A malformed stored hash is an
/// error, not a mismatch: it means the credential row is corrupt.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Auth(AuthError::Hashing(e.to_string())))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(AppError::Auth(AuthError::Hashing(e.to_string()))),
    }
}
