//! Auth HTTP routes: register, login and the token-protected profile.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::auth::{AuthError, AuthService, AuthenticatedUser, Credentials, PublicUser};

pub fn auth_routes(service: AuthService) -> Router {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/profile", get(profile_handler))
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: &'static str,
    pub user: AuthenticatedUser,
}

/// An unreadable body is treated like an empty one.
fn credentials(body: Result<Json<Credentials>, JsonRejection>) -> Credentials {
    body.map(|Json(c)| c).unwrap_or_default()
}

async fn register_handler(
    State(service): State<AuthService>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    service.register(&credentials(body))?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully",
        }),
    ))
}

async fn login_handler(
    State(service): State<AuthService>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let outcome = service.login(&credentials(body))?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        token: outcome.token,
        user: outcome.user,
    }))
}

async fn profile_handler(
    State(service): State<AuthService>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, AuthError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let user = service.authenticate(header)?;
    Ok(Json(ProfileResponse {
        message: "Protected route accessed",
        user,
    }))
}
