//! Machine-wide lock serializing log startup
//!
//! Resolving the directory, rotating and opening the current file must not
//! interleave between processes that start at the same time. All loggers share
//! one lock, regardless of their target.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{LogError, Result};

/// File name of the shared lock, placed in the system temporary directory
pub const STARTUP_LOCK_NAME: &str = "rotalog-startup.lock";

/// Default bound on waiting for the startup lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(300);

#[cfg(unix)]
const SHARED_LOCK_MODE: u32 = 0o666;

const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(500);

/// A mutual-exclusion primitive guarding log startup.
///
/// The lock is held for as long as the returned guard lives.
pub trait StartupLock {
    type Guard;

    /// Block until the lock is held or `timeout` elapses
    fn acquire(&self, timeout: Duration) -> Result<Self::Guard>;
}

/// Cross-process lock backed by an exclusive advisory lock on a shared file
#[derive(Debug, Clone)]
pub struct NamedStartupLock {
    path: PathBuf,
}

impl NamedStartupLock {
    /// Lock on an explicit lock file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for NamedStartupLock {
    fn default() -> Self {
        Self::at(std::env::temp_dir().join(STARTUP_LOCK_NAME))
    }
}

/// Held [`NamedStartupLock`]; unlocks on drop
#[derive(Debug)]
pub struct NamedStartupGuard {
    file: File,
}

impl Drop for NamedStartupGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("Failed to release log startup lock: {}", e);
        }
    }
}

impl StartupLock for NamedStartupLock {
    type Guard = NamedStartupGuard;

    fn acquire(&self, timeout: Duration) -> Result<NamedStartupGuard> {
        let lock_error = |source| LogError::Lock {
            path: self.path.clone(),
            source,
        };

        let file = open_lock_file(&self.path).map_err(lock_error)?;

        // Without a representable deadline the wait is unbounded
        let deadline = Instant::now().checked_add(timeout);
        let mut delay = INITIAL_BACKOFF;
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => return Ok(NamedStartupGuard { file }),
                Err(e) if !is_contended(&e) => return Err(lock_error(e)),
                Err(_) => {}
            }

            let now = Instant::now();
            let pause = match deadline {
                Some(deadline) if now >= deadline => return Err(LogError::LockTimeout(timeout)),
                Some(deadline) => delay.min(deadline - now),
                None => delay,
            };
            tracing::debug!("Waiting for log startup lock {}", self.path.display());
            thread::sleep(pause);
            delay = (delay * 2).min(MAX_BACKOFF);
        }
    }
}

/// Open the shared lock file, creating it writable for every user.
///
/// The file is never truncated or removed, other processes may hold it. A
/// file another user created without write access for us is opened read-only,
/// which is enough for an advisory lock.
fn open_lock_file(path: &Path) -> io::Result<File> {
    match create_lock_file(path) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        created => return created,
    }

    match OpenOptions::new().read(true).write(true).open(path) {
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            OpenOptions::new().read(true).open(path)
        }
        opened => opened,
    }
}

#[cfg(unix)]
fn create_lock_file(path: &Path) -> io::Result<File> {
    use std::fs::Permissions;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .mode(SHARED_LOCK_MODE)
        .open(path)?;
    // The umask strips group and other write bits from `mode`
    if let Err(e) = file.set_permissions(Permissions::from_mode(SHARED_LOCK_MODE)) {
        tracing::warn!("Failed to share log startup lock {}: {}", path.display(), e);
    }
    Ok(file)
}

#[cfg(not(unix))]
fn create_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// In-process stand-in for [`NamedStartupLock`].
///
/// Clones share the same lock.
#[derive(Debug, Clone, Default)]
pub struct LocalStartupLock {
    state: Arc<(Mutex<bool>, Condvar)>,
}

/// Held [`LocalStartupLock`]; releases on drop
#[derive(Debug)]
pub struct LocalStartupGuard {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl Drop for LocalStartupGuard {
    fn drop(&mut self) {
        let (locked, released) = &*self.state;
        *locked.lock().unwrap_or_else(PoisonError::into_inner) = false;
        released.notify_one();
    }
}

impl StartupLock for LocalStartupLock {
    type Guard = LocalStartupGuard;

    fn acquire(&self, timeout: Duration) -> Result<LocalStartupGuard> {
        let (locked, released) = &*self.state;
        let held = locked.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut held, wait) = released
            .wait_timeout_while(held, timeout, |held| *held)
            .unwrap_or_else(PoisonError::into_inner);

        if wait.timed_out() && *held {
            return Err(LogError::LockTimeout(timeout));
        }
        *held = true;

        Ok(LocalStartupGuard {
            state: Arc::clone(&self.state),
        })
    }
}
