//! Log file retention management
//!
//! Ages the numbered files of a log family by one index at startup and drops
//! the oldest, so that at most `retention` files exist per target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{LogError, Result};

/// Upper bound on retention; rotation visits every index below it under the startup lock
pub const MAX_RETENTION: usize = 1000;

/// Where and under what name a log family lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    directory: PathBuf,
    name: String,
    retention: usize,
}

impl LogTarget {
    /// Create a validated target.
    ///
    /// `retention` counts the current file plus the rotated ones and must lie
    /// within `2..=MAX_RETENTION`.
    pub fn new(
        directory: impl Into<PathBuf>,
        name: impl Into<String>,
        retention: usize,
    ) -> Result<Self> {
        let directory = directory.into();
        let name = name.into();

        if directory.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(LogError::EmptyDirectory);
        }
        if name.trim().is_empty() {
            return Err(LogError::EmptyName);
        }
        if !(2..=MAX_RETENTION).contains(&retention) {
            return Err(LogError::InvalidRetention(retention));
        }

        Ok(Self {
            directory,
            name,
            retention,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Path of the file at `index`; index 0 is the current file
    pub fn file_path(&self, index: usize) -> PathBuf {
        if index == 0 {
            self.directory.join(format!("{}.log", self.name))
        } else {
            self.directory.join(format!("{}.{}.log", self.name, index))
        }
    }

    /// Path of the file currently written to
    pub fn current_path(&self) -> PathBuf {
        self.file_path(0)
    }
}

/// Shift every existing file of the family up by one index.
///
/// Must run while holding the startup lock. Afterwards the current file
/// (index 0) does not exist. Missing files are skipped, so a sparse family
/// stays sparse.
pub fn rotate(target: &LogTarget) -> Result<()> {
    ensure_directory(target.directory())?;

    let oldest = target.file_path(target.retention() - 1);
    if oldest.exists() {
        let removed = fs::remove_file(&oldest).and_then(|()| {
            if oldest.exists() {
                Err(io::Error::new(io::ErrorKind::Other, "file still present after delete"))
            } else {
                Ok(())
            }
        });
        if let Err(source) = removed {
            return Err(LogError::DeleteFailed {
                path: oldest,
                source,
            });
        }
        tracing::debug!("Deleted oldest log file {}", oldest.display());
    }

    for i in (1..target.retention()).rev() {
        let source = target.file_path(i - 1);
        let dest = target.file_path(i);

        if !source.exists() {
            continue;
        }
        if dest.exists() {
            return Err(LogError::UnexpectedFile(dest));
        }

        let moved = fs::rename(&source, &dest).and_then(|()| {
            if source.exists() || !dest.exists() {
                Err(io::Error::new(io::ErrorKind::Other, "file not moved after rename"))
            } else {
                Ok(())
            }
        });
        if let Err(cause) = moved {
            return Err(LogError::RenameFailed {
                from: source,
                to: dest,
                source: cause,
            });
        }
        tracing::debug!("Rotated {} -> {}", source.display(), dest.display());
    }

    Ok(())
}

/// Create the log directory, but only one level deep
fn ensure_directory(directory: &Path) -> Result<()> {
    if directory.is_dir() {
        return Ok(());
    }

    let parent = match directory.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Err(LogError::ParentMissing(directory.to_path_buf())),
    };
    if !parent.is_dir() {
        return Err(LogError::ParentMissing(directory.to_path_buf()));
    }

    fs::create_dir(directory).map_err(|source| LogError::CreateDirectory {
        path: directory.to_path_buf(),
        source,
    })
}
