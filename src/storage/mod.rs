//! Document log for rosterdb collections
//!
//! Each collection persists to a single append-only file of checksummed
//! records under `<data_dir>/data/<collection>.dat`.
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates)
//! - Checksum-verified on every read
//! - Latest record wins for the same document id
//! - Tombstones mark deletions
//! - fsync before a write is acknowledged
//!
//! Stores replay the log once at open time and keep the live documents in
//! memory; the log is not read again while the store is serving.

mod checksum;
mod errors;
mod reader;
mod record;
mod writer;

pub use checksum::compute_checksum;
pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use reader::LogReader;
pub use record::LogRecord;
pub use writer::LogWriter;
