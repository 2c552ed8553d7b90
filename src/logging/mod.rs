//! Logging system for rotalog
//!
//! Provides append-only file logs rotated at startup, the machine-wide lock
//! that keeps concurrent startups from racing, default location discovery,
//! and echo decorators.

mod echo;
mod file_writer;
mod level;
mod location;
mod retention;
mod startup_lock;

pub use echo::{level_marker, ConsoleEcho, DebugEcho};
pub use file_writer::{format_line, open, FileLog, LogOpener, Logger, TIMESTAMP_FORMAT};
pub use level::{
    level_tag, Log, LogLevel, NullLog, FLAG_DONT_ECHO, FLAG_LEVEL_CRITICAL, FLAG_LEVEL_DETAIL,
    FLAG_LEVEL_ERROR, FLAG_LEVEL_MASK, FLAG_LEVEL_MESSAGE, FLAG_LEVEL_WARNING,
};
pub use location::{
    default_candidates, default_name, first_writable, probe_writable, resolve_default_directory,
    Candidate, APP_DIR_NAME, DEFAULT_RETENTION,
};
pub use retention::{rotate, LogTarget, MAX_RETENTION};
pub use startup_lock::{
    LocalStartupGuard, LocalStartupLock, NamedStartupGuard, NamedStartupLock, StartupLock,
    DEFAULT_LOCK_TIMEOUT, STARTUP_LOCK_NAME,
};
