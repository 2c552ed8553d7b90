//! Append-only file logging
//!
//! Opens the current log file of a family after rotating it, and appends one
//! flushed line per message for the lifetime of the logger.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};

use super::level::{level_tag, Log, NullLog};
use super::location::{default_name, resolve_default_directory, DEFAULT_RETENTION};
use super::retention::{rotate, LogTarget, MAX_RETENTION};
use super::startup_lock::{NamedStartupLock, StartupLock, DEFAULT_LOCK_TIMEOUT};
use crate::error::{LogError, Result};

/// Timestamp layout of every line. Local wall clock, but marked `Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// Format a single log line without the trailing newline
pub fn format_line(timestamp: &DateTime<Local>, flags: u32, message: &str) -> String {
    format!(
        "{}|{} {}",
        timestamp.format(TIMESTAMP_FORMAT),
        level_tag(flags),
        message
    )
}

/// A log writing to the current file of a rotated log family
#[derive(Debug)]
pub struct FileLog {
    target: LogTarget,
    file: Mutex<File>,
}

impl FileLog {
    /// Start configuring a file log
    pub fn builder() -> LogOpener {
        LogOpener::new()
    }

    /// Rotate and open `target`, serialized by the machine-wide startup lock
    pub fn open(target: LogTarget) -> Result<Self> {
        Self::open_with_lock(target, &NamedStartupLock::default(), DEFAULT_LOCK_TIMEOUT)
    }

    /// Rotate and open `target` while holding `lock`
    pub fn open_with_lock<L: StartupLock>(
        target: LogTarget,
        lock: &L,
        timeout: Duration,
    ) -> Result<Self> {
        let _guard = lock.acquire(timeout)?;
        Self::rotate_and_open(target)
    }

    fn rotate_and_open(target: LogTarget) -> Result<Self> {
        rotate(&target)?;

        let path = target.current_path();
        let file = open_append(&path).map_err(|source| LogError::Open {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Opened log file {}", path.display());

        Ok(Self {
            target,
            file: Mutex::new(file),
        })
    }

    pub fn target(&self) -> &LogTarget {
        &self.target
    }

    /// Path the file had when it was opened. Another process may have
    /// rotated it away since.
    pub fn path(&self) -> PathBuf {
        self.target.current_path()
    }
}

impl Log for FileLog {
    fn write(&self, flags: u32, message: &str) -> Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        // Stamped under the lock so timestamps never go backwards in the file
        let mut line = format_line(&Local::now(), flags, message);
        line.push('\n');

        file.write_all(line.as_bytes()).map_err(LogError::Write)?;
        file.flush().map_err(LogError::Write)
    }
}

/// Open for appending while letting other processes read, rename and delete
/// the file. The handle is never reopened by path.
#[cfg(windows)]
fn open_append(path: &Path) -> std::io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_SHARE_READ: u32 = 0x0000_0001;
    const FILE_SHARE_DELETE: u32 = 0x0000_0004;

    OpenOptions::new()
        .create(true)
        .append(true)
        .share_mode(FILE_SHARE_READ | FILE_SHARE_DELETE)
        .open(path)
}

#[cfg(not(windows))]
fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Builder for [`FileLog`].
///
/// Unset directory and name fall back to [`resolve_default_directory`] and
/// [`default_name`]; the directory is resolved while the startup lock is held.
#[derive(Debug, Clone)]
pub struct LogOpener<L = NamedStartupLock> {
    directory: Option<PathBuf>,
    name: Option<String>,
    retention: usize,
    lock_timeout: Duration,
    lock: L,
}

impl LogOpener {
    pub fn new() -> Self {
        Self {
            directory: None,
            name: None,
            retention: DEFAULT_RETENTION,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            lock: NamedStartupLock::default(),
        }
    }
}

impl Default for LogOpener {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: StartupLock> LogOpener<L> {
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of files kept, current one included
    pub fn retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Serialize startup through a different lock
    pub fn lock<M: StartupLock>(self, lock: M) -> LogOpener<M> {
        LogOpener {
            directory: self.directory,
            name: self.name,
            retention: self.retention,
            lock_timeout: self.lock_timeout,
            lock,
        }
    }

    pub fn open(self) -> Result<FileLog> {
        // Fail on bad arguments before touching the lock or the disk
        if !(2..=MAX_RETENTION).contains(&self.retention) {
            return Err(LogError::InvalidRetention(self.retention));
        }
        let name = self.name.unwrap_or_else(default_name);

        let _guard = self.lock.acquire(self.lock_timeout)?;
        let directory = self.directory.unwrap_or_else(resolve_default_directory);
        let target = LogTarget::new(directory, name, self.retention)?;
        FileLog::rotate_and_open(target)
    }
}

/// A log that is either switched off or writes to a file
#[derive(Debug)]
pub enum Logger {
    Null(NullLog),
    File(FileLog),
}

impl Logger {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Logger::File(_))
    }

    /// Current file path, if writing to a file
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Logger::Null(_) => None,
            Logger::File(log) => Some(log.path()),
        }
    }
}

impl Log for Logger {
    fn write(&self, flags: u32, message: &str) -> Result<()> {
        match self {
            Logger::Null(log) => log.write(flags, message),
            Logger::File(log) => log.write(flags, message),
        }
    }
}

/// Open a log in `directory` named `name`.
///
/// Without both directory and name the log is switched off. Giving only one
/// of them is an error.
pub fn open(directory: Option<PathBuf>, name: Option<String>, retention: usize) -> Result<Logger> {
    match (directory, name) {
        (None, None) => Ok(Logger::Null(NullLog)),
        (Some(_), None) => Err(LogError::IncompleteTarget { missing: "name" }),
        (None, Some(_)) => Err(LogError::IncompleteTarget {
            missing: "directory",
        }),
        (Some(directory), Some(name)) => {
            let target = LogTarget::new(directory, name, retention)?;
            FileLog::open(target).map(Logger::File)
        }
    }
}
