//! Error types for atomicappend
//!
//! Provides a unified error type for the append engine and the CLI.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using AppendError
pub type Result<T> = std::result::Result<T, AppendError>;

/// Unified error type for append operations
#[derive(Debug, Error)]
pub enum AppendError {
    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Message too large: line needs {required} bytes, limit is {limit}")]
    MessageTooLarge { required: usize, limit: usize },

    // -------------------------------------------------------------------------
    // File Errors
    // -------------------------------------------------------------------------
    #[error("Could not open '{}': {source}", .path.display())]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Write to '{}' failed: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Lock Errors
    // -------------------------------------------------------------------------
    #[error("Timed out locking '{}' after {attempts} attempts", .path.display())]
    LockTimeout { path: PathBuf, attempts: u32 },

    #[error("Locking '{}' failed: {source}", .path.display())]
    LockFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Exit code for a missing file or message argument on the command line
pub const EXIT_USAGE: i32 = 1;

impl AppendError {
    /// Process exit code the CLI reports for this error.
    ///
    /// Every variant has its own code, none of them `0` or [`EXIT_USAGE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            AppendError::InvalidArgument(_) => 2,
            AppendError::OpenFailure { .. } => 3,
            AppendError::LockTimeout { .. } => 4,
            AppendError::MessageTooLarge { .. } => 5,
            AppendError::WriteFailure { .. } => 6,
            AppendError::LockFailure { .. } => 7,
            AppendError::Config(_) => 8,
        }
    }
}
