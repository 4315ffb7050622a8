//! # atomicappend
//!
//! Appends whole lines to a shared file from many independent processes
//! without interleaving or overwriting:
//! - Exclusive advisory (`fcntl`) lock over the file's current contents
//! - Bounded retry with a fixed backoff while another writer holds it
//! - End-of-file re-checked under the lock before writing
//! - One positioned write per line, rolled back if it fails partway
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            atomicappend <file> <message...>                  │
//! │                      (CLI, clap)                             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Appender                                │
//! │        build line → open → lock → re-stat → write            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │ AppendLine  │          │ RegionLocker │
//!   │  (bytes)    │          │ (fcntl lock) │
//!   └─────────────┘          └──────────────┘
//! ```
//!
//! Unix only: the lock protocol relies on POSIX record locks.

#[cfg(not(unix))]
compile_error!("atomicappend requires a Unix platform with POSIX record locks");

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod append;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AppendError, Result};
pub use config::{Config, SyncStrategy};
pub use append::{atomic_append, AppendReport, Appender};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of atomicappend
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
