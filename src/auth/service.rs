//! # Auth Service
//!
//! Register, login and token authentication over a user repository.

use std::sync::Arc;

use serde::Serialize;

use super::crypto::PasswordPolicy;
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtClaims, JwtManager};
use super::user::{Credentials, PublicUser, User, UserRepository};
use crate::observability::{Event, Logger, MetricsRegistry};

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: PublicUser,
}

/// Identity recovered from a valid bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl From<JwtClaims> for AuthenticatedUser {
    fn from(claims: JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            iat: claims.iat,
            exp: claims.exp,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtManager,
    policy: PasswordPolicy,
    metrics: Arc<MetricsRegistry>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt: JwtManager,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            users,
            jwt,
            policy: PasswordPolicy::default(),
            metrics,
        }
    }

    pub fn register(&self, credentials: &Credentials) -> AuthResult<PublicUser> {
        let (email, password) = required_credentials(credentials)?;
        let user = User::new(email, password, &self.policy)?;
        self.users.create(&user)?;

        self.metrics.increment_users_registered();
        let id = user.id.to_string();
        Logger::event(Event::UserRegistered, &[("user_id", id.as_str())]);
        Ok(user.public())
    }

    pub fn login(&self, credentials: &Credentials) -> AuthResult<LoginOutcome> {
        let result = self.try_login(credentials);
        match &result {
            Ok(outcome) => {
                self.metrics.increment_logins_succeeded();
                let id = outcome.user.id.to_string();
                Logger::event(Event::LoginSucceeded, &[("user_id", id.as_str())]);
            }
            Err(err) => {
                self.metrics.increment_logins_failed();
                Logger::event(Event::LoginFailed, &[("code", err.code())]);
            }
        }
        result
    }

    fn try_login(&self, credentials: &Credentials) -> AuthResult<LoginOutcome> {
        let (email, password) = match required_credentials(credentials) {
            Ok(pair) => pair,
            Err(_) => return Err(AuthError::InvalidCredentials),
        };

        let user = self
            .users
            .find_by_email(email)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !user.verify_password(password)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(LoginOutcome {
            token: self.jwt.generate_access_token(&user)?,
            user: user.public(),
        })
    }

    /// Validates an `Authorization` header value of the form `Bearer <token>`.
    pub fn authenticate(&self, header: Option<&str>) -> AuthResult<AuthenticatedUser> {
        let token = header
            .and_then(|value| value.split_whitespace().nth(1))
            .ok_or(AuthError::AuthenticationRequired)?;

        match self.jwt.validate_token(token) {
            Ok(claims) => Ok(claims.into()),
            Err(err) => {
                Logger::event(Event::TokenRejected, &[("code", err.code())]);
                Err(err)
            }
        }
    }
}

fn required_credentials(credentials: &Credentials) -> AuthResult<(&str, &str)> {
    let email = credentials
        .email
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(AuthError::MissingField("email"))?;
    let password = credentials
        .password
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::MissingField("password"))?;
    Ok((email, password))
}
