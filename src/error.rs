/// Unified Error Handling Module
///
/// Control flow uses typed `Result`s throughout; every failure surfaces
/// immediately to the caller (no retries, nothing swallowed). The HTTP
/// mapping deliberately collapses all credential, token, and refresh-token
/// failures into a single opaque 401 so external callers cannot distinguish
/// "no such user" from "wrong password", or "revoked" from "never issued".

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Access-token verification failures, in the order the codec checks them:
/// structural parse, signature, expiry, issuer, subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    BadSignature,
    Expired,
    WrongIssuer,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "access token is malformed"),
            TokenError::BadSignature => write!(f, "access token signature mismatch"),
            TokenError::Expired => write!(f, "access token has expired"),
            TokenError::WrongIssuer => write!(f, "access token has wrong issuer"),
        }
    }
}

impl StdError for TokenError {}

/// Refresh-token store failures. Kept distinct internally for logging and
/// tests; externally they all map to the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenError {
    NotFound,
    Expired,
    Revoked,
}

impl fmt::Display for RefreshTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshTokenError::NotFound => write!(f, "refresh token not found"),
            RefreshTokenError::Expired => write!(f, "refresh token has expired"),
            RefreshTokenError::Revoked => write!(f, "refresh token has been revoked"),
        }
    }
}

impl StdError for RefreshTokenError {}

/// Authentication and authorization errors
#[derive(Debug)]
pub enum AuthError {
    /// Bad email/password pair. Deliberately carries no cause: the
    /// missing-user and wrong-password paths must be indistinguishable.
    InvalidCredentials,
    /// Authorization header absent or not exactly `Bearer <token>`.
    MissingCredential,
    /// Stored hash malformed or hasher internal failure.
    Hashing(String),
    Token(TokenError),
    Refresh(RefreshTokenError),
    /// Authenticated but not allowed (e.g. deleting someone else's chirp).
    Forbidden,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid email or password"),
            AuthError::MissingCredential => write!(f, "missing bearer credential"),
            AuthError::Hashing(msg) => write!(f, "password hashing failure: {}", msg),
            AuthError::Token(e) => write!(f, "{}", e),
            AuthError::Refresh(e) => write!(f, "{}", e),
            AuthError::Forbidden => write!(f, "operation not permitted"),
        }
    }
}

impl StdError for AuthError {}

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Database operation errors
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    QueryExecution(String),
    ConnectionPool(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => write!(f, "duplicate entry: {}", msg),
            DatabaseError::NotFound(msg) => write!(f, "not found: {}", msg),
            DatabaseError::QueryExecution(msg) => write!(f, "query error: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "database connection error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    Config(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Config(msg) => write!(f, "configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Auth(AuthError::Token(err))
    }
}

impl From<RefreshTokenError> for AppError {
    fn from(err: RefreshTokenError) -> Self {
        AppError::Auth(AuthError::Refresh(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                AppError::Database(DatabaseError::NotFound("record not found".to_string()))
            }
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                AppError::Database(DatabaseError::UniqueConstraintViolation(
                    "email already registered".to_string(),
                ))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Database(DatabaseError::ConnectionPool(err.to_string()))
            }
            _ => AppError::Database(DatabaseError::QueryExecution(err.to_string())),
        }
    }
}

/// Error response body. Messages are generic by design; the detailed cause
/// only reaches the structured logs, keyed by `error_id`.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error_id: String,
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl AppError {
    fn response_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }

            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => {
                    (StatusCode::CONFLICT, "DUPLICATE_ENTRY", e.to_string())
                }
                DatabaseError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
                }
                DatabaseError::ConnectionPool(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "database temporarily unavailable".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "database error occurred".to_string(),
                ),
            },

            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    "invalid email or password".to_string(),
                ),
                // Missing header, bad/expired access token, unknown/expired/
                // revoked refresh token: one opaque message for all of them.
                AuthError::MissingCredential | AuthError::Token(_) | AuthError::Refresh(_) => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "unauthorized, please log in again".to_string(),
                ),
                AuthError::Hashing(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error".to_string(),
                ),
                AuthError::Forbidden => (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "operation not permitted".to_string(),
                ),
            },

            AppError::Config(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal server error".to_string(),
            ),
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "validation error");
            }
            AppError::Auth(e) => match e {
                AuthError::Hashing(_) => {
                    tracing::error!(error_id = error_id, error = %e, "hashing failure");
                }
                _ => {
                    tracing::warn!(error_id = error_id, error = %e, "authentication error");
                }
            },
            AppError::Database(e) => {
                tracing::error!(error_id = error_id, error = %e, "database error");
            }
            AppError::Config(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let (status, code, message) = self.response_parts();
        HttpResponse::build(status).json(ErrorResponse {
            error_id,
            message,
            code: code.to_string(),
            status: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn status_code(&self) -> StatusCode {
        self.response_parts().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_error_maps_to_unauthorized() {
        let err: AppError = TokenError::Expired.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn revoked_and_missing_refresh_tokens_are_indistinguishable() {
        let revoked: AppError = RefreshTokenError::Revoked.into();
        let missing: AppError = RefreshTokenError::NotFound.into();

        let (status_a, code_a, msg_a) = revoked.response_parts();
        let (status_b, code_b, msg_b) = missing.response_parts();
        assert_eq!((status_a, code_a, msg_a), (status_b, code_b, msg_b));
    }

    #[test]
    fn invalid_credentials_carries_no_cause() {
        let err: AppError = AuthError::InvalidCredentials.into();
        let (status, _, message) = err.response_parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "invalid email or password");
    }

    #[test]
    fn hashing_failure_is_internal() {
        let err: AppError = AuthError::Hashing("entropy failure".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::TooLong("chirp body", 140);
        assert_eq!(err.to_string(), "chirp body is too long (maximum 140 characters)");
    }
}
