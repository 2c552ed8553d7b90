//! rotalog - process-local append-only logs with startup rotation
//!
//! Each logger owns one open log file. Previous files are aged by one index
//! when a logger starts, keeping a bounded history per target, and a
//! machine-wide lock keeps processes that start at the same time from racing.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{LogError, Result};
pub use logging::{open, FileLog, Log, Logger};
