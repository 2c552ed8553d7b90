//! Message levels, flag bits and the shared `Log` capability

use crate::error::Result;

/// Masks the bits of the flags field that select the message level
pub const FLAG_LEVEL_MASK: u32 = 0x0000_0007;

/// Flag bits for a normal message
pub const FLAG_LEVEL_MESSAGE: u32 = 0x0000_0000;

/// Flag bits for a detail message
pub const FLAG_LEVEL_DETAIL: u32 = 0x0000_0001;

/// Flag bits for a warning
pub const FLAG_LEVEL_WARNING: u32 = 0x0000_0003;

/// Flag bits for an error
pub const FLAG_LEVEL_ERROR: u32 = 0x0000_0005;

/// Flag bits for a critical error
pub const FLAG_LEVEL_CRITICAL: u32 = 0x0000_0007;

/// Marks a message as not to be mirrored by [`ConsoleEcho`](super::ConsoleEcho).
/// The file writer ignores it.
pub const FLAG_DONT_ECHO: u32 = 0x0001_0000;

/// Level of a single log message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Message,
    Detail,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Decode the level from the low bits of `flags`.
    ///
    /// Returns `None` for bit patterns that name no level; those messages are
    /// written without a tag.
    pub fn from_flags(flags: u32) -> Option<Self> {
        match flags & FLAG_LEVEL_MASK {
            FLAG_LEVEL_MESSAGE => Some(LogLevel::Message),
            FLAG_LEVEL_DETAIL => Some(LogLevel::Detail),
            FLAG_LEVEL_WARNING => Some(LogLevel::Warning),
            FLAG_LEVEL_ERROR => Some(LogLevel::Error),
            FLAG_LEVEL_CRITICAL => Some(LogLevel::Critical),
            _ => None,
        }
    }

    /// The level bits for this level
    pub fn flag(&self) -> u32 {
        match self {
            LogLevel::Message => FLAG_LEVEL_MESSAGE,
            LogLevel::Detail => FLAG_LEVEL_DETAIL,
            LogLevel::Warning => FLAG_LEVEL_WARNING,
            LogLevel::Error => FLAG_LEVEL_ERROR,
            LogLevel::Critical => FLAG_LEVEL_CRITICAL,
        }
    }

    /// Tag written into the log line; empty for plain messages
    pub fn tag(&self) -> &'static str {
        match self {
            LogLevel::Message => "",
            LogLevel::Detail => "DETAIL",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Check if this level is a warning or worse
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            LogLevel::Warning | LogLevel::Error | LogLevel::Critical
        )
    }
}

/// Tag for the level encoded in `flags`
pub fn level_tag(flags: u32) -> &'static str {
    LogLevel::from_flags(flags).map_or("", |level| level.tag())
}

/// Replace the level bits of `flags`, keeping every other bit
fn with_level(flags: u32, level: LogLevel) -> u32 {
    (flags & !FLAG_LEVEL_MASK) | level.flag()
}

/// Something that accepts log messages.
///
/// `message` is expected to not contain a line break.
pub trait Log: Send + Sync {
    /// Write a message with the given flags
    fn write(&self, flags: u32, message: &str) -> Result<()>;

    fn critical(&self, message: &str) -> Result<()> {
        self.write(FLAG_LEVEL_CRITICAL, message)
    }

    fn critical_with(&self, flags: u32, message: &str) -> Result<()> {
        self.write(with_level(flags, LogLevel::Critical), message)
    }

    fn error(&self, message: &str) -> Result<()> {
        self.write(FLAG_LEVEL_ERROR, message)
    }

    fn error_with(&self, flags: u32, message: &str) -> Result<()> {
        self.write(with_level(flags, LogLevel::Error), message)
    }

    fn warning(&self, message: &str) -> Result<()> {
        self.write(FLAG_LEVEL_WARNING, message)
    }

    fn warning_with(&self, flags: u32, message: &str) -> Result<()> {
        self.write(with_level(flags, LogLevel::Warning), message)
    }

    fn message(&self, message: &str) -> Result<()> {
        self.write(FLAG_LEVEL_MESSAGE, message)
    }

    fn message_with(&self, flags: u32, message: &str) -> Result<()> {
        self.write(with_level(flags, LogLevel::Message), message)
    }

    fn detail(&self, message: &str) -> Result<()> {
        self.write(FLAG_LEVEL_DETAIL, message)
    }

    fn detail_with(&self, flags: u32, message: &str) -> Result<()> {
        self.write(with_level(flags, LogLevel::Detail), message)
    }
}

/// A log that drops every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl Log for NullLog {
    fn write(&self, _flags: u32, _message: &str) -> Result<()> {
        Ok(())
    }
}
