//! # HTTP Server
//!
//! # Endpoints
//!
//! - `/students`, `/students/summary`, `/students/:id` - student records
//! - `/auth/register`, `/auth/login`, `/auth/profile` - accounts and tokens
//! - `/health`, `/metrics` - liveness and counters

pub mod auth_routes;
pub mod config;
pub mod errors;
pub mod health_routes;
pub mod server;
pub mod student_routes;

pub use config::HttpServerConfig;
pub use errors::ErrorResponse;
pub use server::HttpServer;
