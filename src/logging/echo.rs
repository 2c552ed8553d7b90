//! Echo decorators
//!
//! Wrap another [`Log`] and mirror every message to a second sink after it
//! was written to the inner log.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crossterm::style::{Color, Stylize};

use super::level::{Log, LogLevel, FLAG_DONT_ECHO};
use crate::error::Result;

/// Mirrors messages to stdout, or stderr for alerts when `use_error_out` is set
#[derive(Debug)]
pub struct ConsoleEcho<L> {
    inner: L,
    /// Echo critical, error and warning messages to stderr
    pub use_error_out: bool,
    /// Color messages by level
    pub use_color: bool,
    pub echo_criticals: bool,
    pub echo_errors: bool,
    pub echo_warnings: bool,
    pub echo_messages: bool,
    pub echo_details: bool,
    console: Mutex<()>,
}

impl<L: Log> ConsoleEcho<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            use_error_out: false,
            use_color: true,
            echo_criticals: true,
            echo_errors: true,
            echo_warnings: true,
            echo_messages: true,
            echo_details: true,
            console: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Whether a message with `flags` is mirrored to the console
    pub fn should_echo(&self, flags: u32) -> bool {
        if flags & FLAG_DONT_ECHO != 0 {
            return false;
        }
        match LogLevel::from_flags(flags) {
            Some(LogLevel::Critical) => self.echo_criticals,
            Some(LogLevel::Error) => self.echo_errors,
            Some(LogLevel::Warning) => self.echo_warnings,
            Some(LogLevel::Message) => self.echo_messages,
            Some(LogLevel::Detail) => self.echo_details,
            None => true,
        }
    }

    /// Console text for `message`, colored when enabled
    pub fn render(&self, level: Option<LogLevel>, message: &str) -> String {
        if !self.use_color {
            return message.to_string();
        }
        match level {
            Some(LogLevel::Critical) => message.with(Color::White).on(Color::Red).to_string(),
            Some(LogLevel::Error) => message.with(Color::Red).on(Color::Black).to_string(),
            Some(LogLevel::Warning) => message.with(Color::Yellow).on(Color::Black).to_string(),
            Some(LogLevel::Detail) => message.with(Color::DarkGrey).on(Color::Black).to_string(),
            _ => message.to_string(),
        }
    }

    fn echo(&self, level: Option<LogLevel>, message: &str) -> io::Result<()> {
        let text = self.render(level, message);
        let to_stderr = self.use_error_out && level.map_or(false, |l| l.is_alert());

        let _console = self.console.lock().unwrap_or_else(PoisonError::into_inner);
        if to_stderr {
            writeln!(io::stderr().lock(), "{}", text)
        } else {
            writeln!(io::stdout().lock(), "{}", text)
        }
    }
}

impl<L: Log> Log for ConsoleEcho<L> {
    fn write(&self, flags: u32, message: &str) -> Result<()> {
        self.inner.write(flags, message)?;
        if self.should_echo(flags) {
            // The file is the record; a closed console is not an error
            let _ = self.echo(LogLevel::from_flags(flags), message);
        }
        Ok(())
    }
}

/// Mirrors messages as `[<marker>] <message>` into the `tracing` event stream
#[derive(Debug)]
pub struct DebugEcho<L> {
    inner: L,
}

impl<L: Log> DebugEcho<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

/// Single character marking the level of a debug echo line
pub fn level_marker(flags: u32) -> char {
    match LogLevel::from_flags(flags) {
        Some(LogLevel::Critical) => 'C',
        Some(LogLevel::Error) => 'E',
        Some(LogLevel::Warning) => 'W',
        Some(LogLevel::Message) => 'l',
        Some(LogLevel::Detail) => 'd',
        None => '.',
    }
}

impl<L: Log> Log for DebugEcho<L> {
    fn write(&self, flags: u32, message: &str) -> Result<()> {
        self.inner.write(flags, message)?;

        let marker = level_marker(flags);
        match LogLevel::from_flags(flags) {
            Some(LogLevel::Critical | LogLevel::Error) => tracing::error!("[{}] {}", marker, message),
            Some(LogLevel::Warning) => tracing::warn!("[{}] {}", marker, message),
            Some(LogLevel::Message) => tracing::info!("[{}] {}", marker, message),
            Some(LogLevel::Detail) => tracing::debug!("[{}] {}", marker, message),
            None => tracing::trace!("[{}] {}", marker, message),
        }
        Ok(())
    }
}
