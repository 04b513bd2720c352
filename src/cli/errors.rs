//! CLI errors
//!
//! Any of these ends the process with status 1 after printing
//! `<CODE>: <message>` to stderr.

use std::io;

use thiserror::Error;

use crate::storage::StorageError;
use crate::student::StudentError;

/// Stable code for each failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    ConfigError,
    IoError,
    AlreadyInitialized,
    NotInitialized,
    BootFailed,
}

#[derive(Debug, Error)]
pub enum CliError {
    /// Missing, unreadable or invalid configuration
    #[error("ROSTER_CLI_CONFIG_ERROR: {0}")]
    Config(String),

    /// stdout or filesystem failure
    #[error("ROSTER_CLI_IO_ERROR: {0}")]
    Io(String),

    #[error("ROSTER_CLI_ALREADY_INITIALIZED: data directory already initialized")]
    AlreadyInitialized,

    #[error("ROSTER_CLI_NOT_INITIALIZED: data directory not initialized, run 'rosterdb init' first")]
    NotInitialized,

    /// A store could not be opened or read, or the server stopped with an error
    #[error("ROSTER_CLI_BOOT_FAILED: {0}")]
    BootFailed(String),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn already_initialized() -> Self {
        Self::AlreadyInitialized
    }

    pub fn not_initialized() -> Self {
        Self::NotInitialized
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::BootFailed(msg.into())
    }

    pub fn code(&self) -> CliErrorCode {
        match self {
            Self::Config(_) => CliErrorCode::ConfigError,
            Self::Io(_) => CliErrorCode::IoError,
            Self::AlreadyInitialized => CliErrorCode::AlreadyInitialized,
            Self::NotInitialized => CliErrorCode::NotInitialized,
            Self::BootFailed(_) => CliErrorCode::BootFailed,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Io(format!("JSON error: {}", e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::BootFailed(e.to_string())
    }
}

impl From<StudentError> for CliError {
    fn from(e: StudentError) -> Self {
        Self::BootFailed(e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_leads_with_code() {
        let err = CliError::not_initialized();
        assert!(err.to_string().starts_with("ROSTER_CLI_NOT_INITIALIZED: "));
        assert_eq!(err.code(), CliErrorCode::NotInitialized);
    }

    #[test]
    fn test_store_errors_fail_boot() {
        let err = CliError::from(StudentError::store_fault("store is closed"));
        assert_eq!(err.code(), CliErrorCode::BootFailed);
        assert!(err.to_string().contains("store is closed"));
    }
}
