//! rosterdb - student records over a strict, checksummed document store
//!
//! Layers, leaf first:
//! - `storage`: append-only collection logs with CRC32 records
//! - `student`: normalization, validation, filtering and summaries
//! - `store`: the `RecordStore` trait and its log-backed implementation
//! - `auth`: accounts, Argon2id hashes and JWT access tokens
//! - `http_server`: axum routes over the services
//! - `cli`: `init`, `serve` and `summary`

pub mod auth;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod storage;
pub mod store;
pub mod student;
