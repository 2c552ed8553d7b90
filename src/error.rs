//! Error types for log construction and writing

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the logging core
pub type Result<T> = std::result::Result<T, LogError>;

/// Errors raised while constructing or writing to a log
#[derive(Debug, Error)]
pub enum LogError {
    /// Retention must keep the current file plus at least one predecessor and
    /// stay within [`MAX_RETENTION`](crate::logging::MAX_RETENTION)
    #[error("retention must be between 2 and {max}, got {0}", max = crate::logging::MAX_RETENTION)]
    InvalidRetention(usize),

    #[error("log directory must not be empty")]
    EmptyDirectory,

    #[error("log name must not be empty")]
    EmptyName,

    /// Exactly one of directory and name was supplied
    #[error("log directory and name must be given together (missing {missing})")]
    IncompleteTarget { missing: &'static str },

    #[error("parent of log directory '{}' does not exist", .0.display())]
    ParentMissing(PathBuf),

    #[error("failed to create log directory '{}'", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to delete old log file '{}'", path.display())]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rename destination already exists while rotating
    #[error("log file retention error, unexpected log file '{}'", .0.display())]
    UnexpectedFile(PathBuf),

    #[error("log file retention error, unable to move '{}' to '{}'", from.display(), to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("timed out after {0:?} waiting for the log startup lock")]
    LockTimeout(Duration),

    #[error("failed to acquire the log startup lock at '{}'", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file '{}'", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write log message")]
    Write(#[source] io::Error),
}
