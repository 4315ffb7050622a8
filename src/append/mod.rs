//! Atomic Append Module
//!
//! Appends whole lines to a file shared by concurrent writer processes.
//!
//! ## Responsibilities
//! - Join message tokens into one bounded line
//! - Exclusive advisory lock over the file's current contents
//! - Bounded, fixed-interval retry on lock contention
//! - Write at the end of file as observed under the lock
//!
//! ## Lock Protocol
//! ```text
//!   writer A                         writer B
//!   ────────                         ────────
//!   open, size = 10                  open, size = 10
//!   lock [0,10)  ✓                   lock [0,10)  ✗ contended
//!   size = 10, write at 10           sleep
//!   close (unlock)                   lock [0,10)  ✓
//!                                    size = 16, write at 16
//!                                    close (unlock)
//! ```
//! Every region starts at 0, so any two requests conflict.

mod line;
mod lock;
mod engine;

pub use line::AppendLine;
pub use lock::{LockAttempt, LockRegion, LockedFile, PosixLocker, RegionLocker};
pub use engine::{atomic_append, AppendReport, Appender};
