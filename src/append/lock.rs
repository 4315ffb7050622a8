//! Advisory record locking
//!
//! Exclusive `fcntl` locks over a byte range of the target file, acquired
//! with a bounded, fixed-interval retry loop.
//!
//! ## Region Rules
//! - The region always starts at offset 0 so any two requests overlap.
//! - An empty file is locked as `[0, 1)`: a zero length would mean
//!   "to end of file and beyond" to `fcntl`.

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;

use crate::config::Config;
use crate::error::{AppendError, Result};

/// Byte range covered by an exclusive lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRegion {
    pub start: u64,
    pub len: u64,
}

impl LockRegion {
    /// Region covering the current contents of a file of `size` bytes
    pub fn covering(size: u64) -> Self {
        Self {
            start: 0,
            len: size.max(1),
        }
    }
}

/// Outcome of a single non-blocking lock attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAttempt {
    /// The lock is now held through the file's descriptor
    Acquired,

    /// Another holder has a conflicting lock
    Contended,
}

/// Non-blocking exclusive lock primitive.
///
/// Implementations must return `Contended` only for conflicts that may go
/// away by waiting; every other failure is an `Err`.
pub trait RegionLocker {
    fn try_lock(&self, file: &File, region: LockRegion) -> io::Result<LockAttempt>;
}

impl<L: RegionLocker + ?Sized> RegionLocker for &L {
    fn try_lock(&self, file: &File, region: LockRegion) -> io::Result<LockAttempt> {
        (**self).try_lock(file, region)
    }
}

/// POSIX record locks through `fcntl(F_SETLK)`.
///
/// Locks belong to the calling process and are dropped when any descriptor
/// of the file is closed by that process.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixLocker;

impl RegionLocker for PosixLocker {
    fn try_lock(&self, file: &File, region: LockRegion) -> io::Result<LockAttempt> {
        let start = libc::off_t::try_from(region.start)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "lock start out of range"))?;
        let len = libc::off_t::try_from(region.len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "lock length out of range"))?;

        // SAFETY: an all-zero flock is a valid value; the fields we rely on are set below
        let mut request: libc::flock = unsafe { std::mem::zeroed() };
        request.l_type = libc::F_WRLCK as _;
        request.l_whence = libc::SEEK_SET as _;
        request.l_start = start;
        request.l_len = len;

        // SAFETY: the descriptor is owned by `file` and `request` outlives the call
        let rc = unsafe {
            libc::fcntl(file.as_raw_fd(), libc::F_SETLK, &request as *const libc::flock)
        };
        if rc == 0 {
            return Ok(LockAttempt::Acquired);
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(code) if code == libc::EACCES || code == libc::EAGAIN => {
                Ok(LockAttempt::Contended)
            }
            _ => Err(err),
        }
    }
}

/// An open file whose lock region is held.
///
/// Dropping it closes the descriptor, which releases the lock.
#[derive(Debug)]
pub struct LockedFile {
    file: File,
    attempts: u32,
}

impl LockedFile {
    /// Try to lock `region` of `file`, retrying on contention.
    ///
    /// Makes at most `config.lock_max_attempts` attempts and sleeps
    /// `config.lock_backoff` between them. Interrupted attempts are repeated
    /// without counting against the budget. On any failure `file` is dropped
    /// (and thereby closed) before returning.
    pub fn acquire<L: RegionLocker>(
        file: File,
        region: LockRegion,
        locker: &L,
        config: &Config,
        path: &Path,
    ) -> Result<Self> {
        let mut attempts = 0;

        while attempts < config.lock_max_attempts {
            attempts += 1;

            match locker.try_lock(&file, region) {
                Ok(LockAttempt::Acquired) => {
                    tracing::debug!(?path, ?region, attempts, "lock acquired");
                    return Ok(Self { file, attempts });
                }
                Ok(LockAttempt::Contended) => {
                    tracing::debug!(?path, attempts, "lock contended");
                    if attempts < config.lock_max_attempts {
                        thread::sleep(config.lock_backoff);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    attempts -= 1;
                }
                Err(e) => {
                    return Err(AppendError::LockFailure {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            }
        }

        tracing::warn!(?path, attempts, "gave up waiting for lock");
        Err(AppendError::LockTimeout {
            path: path.to_path_buf(),
            attempts,
        })
    }

    /// The locked file
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Number of attempts it took to get the lock
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
