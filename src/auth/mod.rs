//! # Auth
//!
//! Account registration, password login and bearer-token authentication.
//! Passwords are stored as Argon2id hashes; access tokens are HS256 JWTs
//! valid for one hour.

pub mod crypto;
pub mod errors;
pub mod jwt;
pub mod service;
pub mod user;

pub use crypto::PasswordPolicy;
pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtClaims, JwtConfig, JwtManager};
pub use service::{AuthService, AuthenticatedUser, LoginOutcome};
pub use user::{Credentials, PublicUser, User, UserDirectory, UserRepository};
