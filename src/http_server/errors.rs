//! Error responses
//!
//! Every failure leaves the server as `{error, code, status, field?}` with
//! the matching HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::student::StudentError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    fn into_http(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<&StudentError> for ErrorResponse {
    fn from(err: &StudentError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
            status: err.status_code(),
            field: err.field().map(str::to_string),
        }
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
            status: err.status_code(),
            field: match err {
                AuthError::MissingField(field) => Some(field.to_string()),
                _ => None,
            },
        }
    }
}

impl IntoResponse for StudentError {
    fn into_response(self) -> Response {
        ErrorResponse::from(&self).into_http()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ErrorResponse::from(&self).into_http()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_error_body() {
        let body = ErrorResponse::from(&StudentError::DuplicateKey { field: "email" });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], "email already exists");
        assert_eq!(json["code"], "DUPLICATE_KEY");
        assert_eq!(json["status"], 409);
        assert_eq!(json["field"], "email");
    }

    #[test]
    fn test_field_omitted_when_absent() {
        let json = serde_json::to_value(ErrorResponse::from(&StudentError::NotFound)).unwrap();
        assert!(json.get("field").is_none());
    }

    #[test]
    fn test_status_carried_to_response() {
        assert_eq!(
            StudentError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::InvalidToken.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
