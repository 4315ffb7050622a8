//! Configuration for atomicappend
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{AppendError, Result};

/// Default number of lock attempts before giving up
pub const DEFAULT_LOCK_MAX_ATTEMPTS: u32 = 300;

/// Default wait between lock attempts
pub const DEFAULT_LOCK_BACKOFF: Duration = Duration::from_secs(2);

/// Default capacity of the append buffer (16 MiB), newline included
pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

/// Default permission bits for a newly created target file
pub const DEFAULT_CREATE_MODE: u32 = 0o644;

/// Main configuration for an append engine
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Lock Configuration
    // -------------------------------------------------------------------------
    /// Maximum number of non-blocking lock attempts.
    /// With the default backoff this bounds the wait at roughly 10 minutes.
    pub lock_max_attempts: u32,

    /// Fixed sleep between two failed lock attempts (no exponential growth)
    pub lock_backoff: Duration,

    // -------------------------------------------------------------------------
    // Line Configuration
    // -------------------------------------------------------------------------
    /// Largest line accepted, separators and trailing newline included
    pub max_line_bytes: usize,

    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Mode used when the target file has to be created (umask still applies)
    pub create_mode: u32,

    /// Whether to flush file data to disk before the lock is released
    pub sync_strategy: SyncStrategy,
}

/// Durability strategy for appended lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Leave flushing to the OS (plain write)
    Never,

    /// fdatasync after every append, while the lock is still held
    EveryAppend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_max_attempts: DEFAULT_LOCK_MAX_ATTEMPTS,
            lock_backoff: DEFAULT_LOCK_BACKOFF,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            create_mode: DEFAULT_CREATE_MODE,
            sync_strategy: SyncStrategy::Never,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.lock_max_attempts == 0 {
            return Err(AppendError::Config(
                "lock_max_attempts must be at least 1".to_string(),
            ));
        }
        if self.max_line_bytes == 0 {
            return Err(AppendError::Config(
                "max_line_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum number of lock attempts
    pub fn lock_max_attempts(mut self, attempts: u32) -> Self {
        self.config.lock_max_attempts = attempts;
        self
    }

    /// Set the wait between lock attempts
    pub fn lock_backoff(mut self, backoff: Duration) -> Self {
        self.config.lock_backoff = backoff;
        self
    }

    /// Set the largest accepted line (in bytes, newline included)
    pub fn max_line_bytes(mut self, bytes: usize) -> Self {
        self.config.max_line_bytes = bytes;
        self
    }

    /// Set the permission bits used when creating the file
    pub fn create_mode(mut self, mode: u32) -> Self {
        self.config.create_mode = mode;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.lock_max_attempts, 300);
        assert_eq!(config.lock_backoff, Duration::from_secs(2));
        assert_eq!(config.max_line_bytes, 16_777_216);
        assert_eq!(config.create_mode, 0o644);
        assert_eq!(config.sync_strategy, SyncStrategy::Never);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::builder()
            .lock_max_attempts(5)
            .lock_backoff(Duration::from_millis(10))
            .max_line_bytes(64)
            .create_mode(0o600)
            .sync_strategy(SyncStrategy::EveryAppend)
            .build();

        assert_eq!(config.lock_max_attempts, 5);
        assert_eq!(config.lock_backoff, Duration::from_millis(10));
        assert_eq!(config.max_line_bytes, 64);
        assert_eq!(config.create_mode, 0o600);
        assert_eq!(config.sync_strategy, SyncStrategy::EveryAppend);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = Config::builder().lock_max_attempts(0).build();
        assert!(matches!(config.validate(), Err(AppendError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_line_limit() {
        let config = Config::builder().max_line_bytes(0).build();
        assert!(matches!(config.validate(), Err(AppendError::Config(_))));
    }
}
