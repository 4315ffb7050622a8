//! Atomic Append Engine
//!
//! Appends one line to a shared file under an exclusive advisory lock.
//!
//! ## Sequence
//! 1. Build the line (no I/O if it is empty or too large)
//! 2. Open or create the file (read + write)
//! 3. Lock `[0, size)` with bounded retries
//! 4. Re-read the size under the lock; that is the write offset
//! 5. Write the whole line at the offset, rolling back on failure
//! 6. Optionally sync, then close (releases the lock)

use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::{FileExt, OpenOptionsExt};
use std::path::Path;

use crate::config::{Config, SyncStrategy};
use crate::error::{AppendError, Result};

use super::{AppendLine, LockRegion, LockedFile, PosixLocker, RegionLocker};

/// What a successful append did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendReport {
    /// Offset the line starts at (end of file once the lock was held)
    pub offset: u64,

    /// Bytes written, newline included
    pub bytes_written: usize,

    /// Lock attempts used
    pub lock_attempts: u32,
}

/// Appends whole lines to files, one lock per call
///
/// Holds no state between calls; any number of appenders (in any number of
/// processes) may target the same file.
#[derive(Debug, Clone)]
pub struct Appender<L = PosixLocker> {
    config: Config,
    locker: L,
}

impl Appender<PosixLocker> {
    /// Create an appender backed by POSIX record locks
    pub fn new(config: Config) -> Self {
        Self::with_locker(config, PosixLocker)
    }
}

impl Default for Appender<PosixLocker> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<L: RegionLocker> Appender<L> {
    /// Create an appender with a custom lock primitive
    pub fn with_locker(config: Config, locker: L) -> Self {
        Self { config, locker }
    }

    /// Append `messages`, joined by single spaces and terminated by a
    /// newline, to the file at `path`.
    ///
    /// Either the whole line lands after the file's current end, or the file
    /// is left as it was.
    pub fn append<S: AsRef<[u8]>>(&self, path: &Path, messages: &[S]) -> Result<AppendReport> {
        self.config.validate()?;

        let line = AppendLine::build(messages, self.config.max_line_bytes)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .mode(self.config.create_mode)
            .open(path)
            .map_err(|source| AppendError::OpenFailure {
                path: path.to_path_buf(),
                source,
            })?;

        let size = file
            .metadata()
            .map_err(|source| AppendError::OpenFailure {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        tracing::debug!(?path, size, "opened target");

        let region = LockRegion::covering(size);
        let locked = LockedFile::acquire(file, region, &self.locker, &self.config, path)?;

        // The file may have grown while we waited
        let offset = locked
            .file()
            .metadata()
            .map_err(|source| write_failure(path, source))?
            .len();

        self.write_line(&locked, offset, &line, path)?;

        if self.config.sync_strategy == SyncStrategy::EveryAppend {
            if let Err(e) = locked.file().sync_data() {
                return Err(rollback(&locked, offset, line.len(), path, e));
            }
        }

        tracing::debug!(?path, offset, len = line.len(), "line appended");

        Ok(AppendReport {
            offset,
            bytes_written: line.len(),
            lock_attempts: locked.attempts(),
        })
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write the whole line at `offset`.
    ///
    /// Short writes continue at the advancing offset. If the write fails
    /// partway, the file is truncated back to `offset` before returning.
    fn write_line(
        &self,
        locked: &LockedFile,
        offset: u64,
        line: &AppendLine,
        path: &Path,
    ) -> Result<()> {
        let file = locked.file();
        let bytes = line.as_bytes();
        let mut written = 0;

        while written < bytes.len() {
            match file.write_at(&bytes[written..], offset + written as u64) {
                Ok(0) => {
                    let e = io::Error::from(io::ErrorKind::WriteZero);
                    return Err(rollback(locked, offset, written, path, e));
                }
                Ok(n) => {
                    written += n;
                    if written < bytes.len() {
                        tracing::warn!(?path, written, total = bytes.len(), "short write, continuing");
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(rollback(locked, offset, written, path, e)),
            }
        }

        Ok(())
    }
}

/// Convenience wrapper: append with the default configuration.
///
/// ```no_run
/// atomicappend::atomic_append("shared.log", &["job", "42", "done"])?;
/// # Ok::<(), atomicappend::AppendError>(())
/// ```
pub fn atomic_append<P, S>(path: P, messages: &[S]) -> Result<AppendReport>
where
    P: AsRef<Path>,
    S: AsRef<[u8]>,
{
    Appender::default().append(path.as_ref(), messages)
}

fn write_failure(path: &Path, source: io::Error) -> AppendError {
    AppendError::WriteFailure {
        path: path.to_path_buf(),
        source,
    }
}

/// Truncate back to `offset` if anything was written, and build the error
/// to report
fn rollback(
    locked: &LockedFile,
    offset: u64,
    written: usize,
    path: &Path,
    source: io::Error,
) -> AppendError {
    if written > 0 {
        if let Err(e) = locked.file().set_len(offset) {
            tracing::error!(?path, offset, written, error = %e, "failed to roll back partial line");
        }
    }
    write_failure(path, source)
}
