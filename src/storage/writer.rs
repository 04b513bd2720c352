//! Append-only log writer with fsync enforcement
//!
//! A write is acknowledged only after the record bytes have been fsynced.
//! The file is never rewritten in place. A failed append is cut back off
//! the end of the file; if that also fails the writer refuses further
//! appends.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::reader::LogReader;
use super::record::LogRecord;

/// Writer for one collection log (`<data_dir>/data/<collection>.dat`).
pub struct LogWriter {
    path: PathBuf,
    file: File,
    current_offset: u64,
    fenced: bool,
}

/// The file operations an append needs.
trait LogFile: Write {
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LogFile for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.sync_all()
    }
}

/// Outcome of a failed append
#[derive(Debug)]
struct AppendFailure {
    stage: &'static str,
    source: io::Error,
    rolled_back: bool,
}

/// Writes and fsyncs `bytes` at `offset`. On failure the file is truncated
/// back to `offset` so that nothing of the record survives.
fn append_bytes<F: LogFile>(
    file: &mut F,
    offset: u64,
    bytes: &[u8],
) -> Result<(), AppendFailure> {
    let result = match file.write_all(bytes) {
        Ok(()) => file.sync().map_err(|e| ("fsync", e)),
        Err(e) => Err(("write", e)),
    };

    result.map_err(|(stage, source)| AppendFailure {
        stage,
        source,
        rolled_back: file.truncate(offset).is_ok(),
    })
}

impl LogWriter {
    /// Opens or creates the log for `collection` under `data_dir`.
    ///
    /// Creates `<data_dir>/data/` if it does not exist.
    pub fn open(data_dir: &Path, collection: &str) -> StorageResult<Self> {
        let data_subdir = data_dir.join("data");
        let path = data_subdir.join(format!("{}.dat", collection));

        if !data_subdir.exists() {
            fs::create_dir_all(&data_subdir).map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to create data directory: {}", data_subdir.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open log file: {}", path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            path,
            file,
            current_offset,
            fenced: false,
        })
    }

    /// Opens the log and replays it, returning the writer and the live documents.
    pub fn open_and_replay(
        data_dir: &Path,
        collection: &str,
    ) -> StorageResult<(Self, HashMap<String, Vec<u8>>)> {
        let writer = Self::open(data_dir, collection)?;
        let live = LogReader::open(&writer.path)?.live_documents()?;
        Ok((writer, live))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Appends a record and fsyncs it. Returns the offset it was written at.
    ///
    /// On failure the partial record is cut back off the file. A writer that
    /// cannot cut it back refuses every later append.
    pub fn append(&mut self, record: &LogRecord) -> StorageResult<u64> {
        if self.fenced {
            return Err(StorageError::write_failed(
                format!("Log is fenced after a failed rollback: {}", self.path.display()),
                io::Error::new(io::ErrorKind::Other, "log fenced"),
            ));
        }

        let serialized = record.serialize();
        let offset = self.current_offset;

        if let Err(failure) = append_bytes(&mut self.file, offset, &serialized) {
            self.fenced = !failure.rolled_back;
            return Err(StorageError::write_failed(
                format!(
                    "{} failed for document {} (rolled back: {})",
                    failure.stage, record.document_id, failure.rolled_back
                ),
                failure.source,
            ));
        }

        self.current_offset += serialized.len() as u64;
        Ok(offset)
    }

    /// Appends a live document version.
    pub fn put(&mut self, document_id: &str, body: Vec<u8>) -> StorageResult<u64> {
        self.append(&LogRecord::put(document_id, body))
    }

    /// Appends a tombstone for `document_id`.
    pub fn delete(&mut self, document_id: &str) -> StorageResult<u64> {
        self.append(&LogRecord::tombstone(document_id))
    }

    /// Flushes outstanding data to disk. Called when a store is closed.
    pub fn sync(&mut self) -> StorageResult<()> {
        self.file
            .sync_all()
            .map_err(|e| StorageError::write_failed("fsync failed on close", e))
    }
}
