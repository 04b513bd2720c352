//! # Auth Errors

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Request Errors
    // ==================
    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    // ==================
    // Token Errors
    // ==================
    /// No bearer token on a protected route
    #[error("Access token required")]
    AuthenticationRequired,

    /// Malformed, expired or wrongly signed token
    #[error("Invalid token")]
    InvalidToken,

    // ==================
    // Internal Errors
    // ==================
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 400,
            AuthError::MissingField(_) => 400,
            AuthError::WeakPassword(_) => 400,

            AuthError::AuthenticationRequired => 401,
            AuthError::InvalidToken => 403,

            AuthError::EmailAlreadyExists => 409,

            AuthError::HashingFailed => 500,
            AuthError::TokenGenerationFailed => 500,
            AuthError::StorageError(_) => 500,
        }
    }

    /// Error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::EmailAlreadyExists => "EMAIL_EXISTS",
            AuthError::MissingField(_) => "VALIDATION_FAILED",
            AuthError::WeakPassword(_) => "WEAK_PASSWORD",
            AuthError::AuthenticationRequired => "AUTH_REQUIRED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::HashingFailed
            | AuthError::TokenGenerationFailed
            | AuthError::StorageError(_) => "AUTH_INTERNAL",
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::StorageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 400);
        assert_eq!(AuthError::AuthenticationRequired.status_code(), 401);
        assert_eq!(AuthError::InvalidToken.status_code(), 403);
        assert_eq!(AuthError::EmailAlreadyExists.status_code(), 409);
        assert_eq!(AuthError::HashingFailed.status_code(), 500);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AuthError::AuthenticationRequired.to_string(),
            "Access token required"
        );
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
        assert_eq!(AuthError::MissingField("email").to_string(), "email is required");
    }

    #[test]
    fn test_invalid_credentials_does_not_leak_info() {
        let message = AuthError::InvalidCredentials.to_string();
        assert!(!message.contains("password"));
        assert!(!message.contains("email"));
    }
}
