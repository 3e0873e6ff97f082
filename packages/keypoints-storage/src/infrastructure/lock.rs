//! Advisory counter lock
//!
//! The lock lives on a sibling file (`<counter>.lock`). On unix it is an
//! exclusive `flock`, which the kernel drops when the holder exits, so a
//! killed invocation never leaves the counter locked. The lock file itself
//! stays in place between runs. Elsewhere the file is created with
//! create-new semantics and removed on release.
//!
//! The lock only protects invocations that also take it; nothing stops a
//! caller from touching the counter file directly.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::{Result, StorageError};

/// Retry policy for acquiring the counter lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    /// Total acquisition attempts before giving up
    pub attempts: u32,
    /// Delay between attempts
    pub retry_delay: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            attempts: 50,
            retry_delay: Duration::from_millis(20),
        }
    }
}

/// Held advisory lock; released on drop
#[derive(Debug)]
pub struct CounterLock {
    path: PathBuf,
    // Holding the descriptor open is what keeps the lock.
    _file: File,
}

impl CounterLock {
    /// Lock file path guarding `counter_path`
    pub fn lock_path(counter_path: &Path) -> PathBuf {
        let mut name = counter_path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Acquire the lock guarding `counter_path`
    ///
    /// # Errors
    ///
    /// `ErrorKind::LockContention` (retryable) when every attempt found the
    /// lock held, `ErrorKind::IO` for any other filesystem failure.
    pub fn acquire(counter_path: &Path, options: LockOptions) -> Result<Self> {
        let path = Self::lock_path(counter_path);
        let attempts = options.attempts.max(1);

        for attempt in 1..=attempts {
            if let Some(file) = try_lock(&path)? {
                debug!("acquired counter lock {} (attempt {})", path.display(), attempt);
                return Ok(Self { path, _file: file });
            }
            if attempt < attempts {
                thread::sleep(options.retry_delay);
            }
        }

        Err(StorageError::lock_contention(path.display(), attempts))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One acquisition attempt; `None` while another holder has the lock
#[cfg(unix)]
fn try_lock(path: &Path) -> io::Result<Option<File>> {
    use std::fs::OpenOptions;
    use std::os::unix::io::AsRawFd;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    // SAFETY: `file` owns a valid descriptor for the duration of the call.
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(Some(file));
    }

    let err = io::Error::last_os_error();
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
        _ => Err(err),
    }
}

#[cfg(not(unix))]
fn try_lock(path: &Path) -> io::Result<Option<File>> {
    use std::fs::OpenOptions;

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(not(unix))]
impl Drop for CounterLock {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!("failed to release counter lock {}: {}", self.path.display(), err);
        }
    }
}
