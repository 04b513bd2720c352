//! # Student Errors
//!
//! Error taxonomy shared by the record store, the service and the HTTP layer.

use std::fmt;

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for student operations
pub type StudentResult<T> = Result<T, StudentError>;

/// Which field and rule a rejected payload violated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Field name as clients send it (e.g. "rollNumber")
    pub field: String,
    /// Human-readable rule that failed
    pub rule: String,
}

impl ValidationDetails {
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }

    pub fn not_in_domain(field: impl Into<String>, value: &str, allowed: &[&str]) -> Self {
        Self::new(
            field,
            format!(
                "`{}` is not a valid value (expected one of: {})",
                value,
                allowed.join(", ")
            ),
        )
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.rule)
    }
}

/// Student record errors
#[derive(Debug, Clone, Error)]
pub enum StudentError {
    /// Missing or out-of-domain field
    #[error("Validation failed: {0}")]
    Validation(ValidationDetails),

    /// Unique constraint violated on `rollNumber` or `email`
    #[error("{field} already exists")]
    DuplicateKey { field: &'static str },

    /// Unknown or malformed identifier
    #[error("Student not found")]
    NotFound,

    /// Persistence unavailable or failed
    #[error("Store fault: {0}")]
    StoreFault(String),
}

impl StudentError {
    pub fn validation(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Validation(ValidationDetails::new(field, rule))
    }

    pub fn store_fault(msg: impl Into<String>) -> Self {
        Self::StoreFault(msg.into())
    }

    /// Error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::DuplicateKey { .. } => "DUPLICATE_KEY",
            Self::NotFound => "NOT_FOUND",
            Self::StoreFault(_) => "STORE_FAULT",
        }
    }

    /// HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::DuplicateKey { .. } => 409,
            Self::NotFound => 404,
            Self::StoreFault(_) => 500,
        }
    }

    /// The offending field, where one applies
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation(details) => Some(&details.field),
            Self::DuplicateKey { field } => Some(field),
            Self::NotFound | Self::StoreFault(_) => None,
        }
    }

    /// Client errors are logged at WARN, store faults at ERROR
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<StorageError> for StudentError {
    fn from(err: StorageError) -> Self {
        Self::StoreFault(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StudentError::validation("status", "bad").status_code(), 400);
        assert_eq!(
            StudentError::DuplicateKey { field: "email" }.status_code(),
            409
        );
        assert_eq!(StudentError::NotFound.status_code(), 404);
        assert_eq!(StudentError::store_fault("disk").status_code(), 500);
    }

    #[test]
    fn test_duplicate_message_names_field() {
        let err = StudentError::DuplicateKey {
            field: "rollNumber",
        };
        assert_eq!(err.to_string(), "rollNumber already exists");
        assert_eq!(err.field(), Some("rollNumber"));
    }

    #[test]
    fn test_validation_message_names_field_and_rule() {
        let err = StudentError::Validation(ValidationDetails::required("fullName"));
        assert_eq!(err.to_string(), "Validation failed: fullName is required");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_storage_error_becomes_store_fault() {
        let err: StudentError = StorageError::data_corruption("bad checksum").into();
        assert_eq!(err.code(), "STORE_FAULT");
        assert!(!err.is_client_error());
    }
}
