//! # Record Store
//!
//! Persistence abstraction for student records. Implementations own their
//! locking and enforce schema and uniqueness on every write.

mod document_store;

pub use document_store::{DocumentStore, STUDENTS_COLLECTION};

use crate::student::{StudentFilter, StudentPayload, StudentRecord, StudentResult};

pub trait RecordStore: Send + Sync {
    /// Validates and stores a new record.
    fn create(&self, payload: &StudentPayload) -> StudentResult<StudentRecord>;

    /// Malformed ids are `NotFound`.
    fn get(&self, id: &str) -> StudentResult<StudentRecord>;

    /// Matching records, ascending by `rollNumber`.
    fn list(&self, filter: &StudentFilter) -> StudentResult<Vec<StudentRecord>>;

    /// Merges the present fields of `payload` onto the stored record and
    /// re-validates the result.
    fn update(&self, id: &str, payload: &StudentPayload) -> StudentResult<StudentRecord>;

    fn delete(&self, id: &str) -> StudentResult<()>;

    fn count(&self) -> StudentResult<u64>;

    /// Flushes and releases the backing log. Later writes fail.
    fn close(&self) -> StudentResult<()>;
}
