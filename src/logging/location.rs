//! Default log location
//!
//! Finds a writable directory for log files when the caller does not name one,
//! and derives the default log name from the running executable.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Subfolder created below the per-user local data root
pub const APP_DIR_NAME: &str = "rotalog";

/// Default number of log files kept per target (current plus rotated)
pub const DEFAULT_RETENTION: usize = 10;

/// A directory that may hold log files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Directory to probe
    pub path: PathBuf,
    /// Create the directory if it does not exist yet
    pub create: bool,
}

impl Candidate {
    fn created(path: PathBuf) -> Self {
        Self { path, create: true }
    }

    fn existing(path: PathBuf) -> Self {
        Self {
            path,
            create: false,
        }
    }
}

/// Returns the default directory where log files are stored.
///
/// Locations are tried in this order, first writable wins:
///
/// | # | Directory |
/// |---|-----------|
/// | 1 | `<local data root>/rotalog` (`LocalLow` on Windows when available) |
/// | 2 | `logs` next to the running executable |
/// | 3 | the directory of the running executable |
/// | 4 | `logs` in the current working directory |
/// | 5 | the current working directory, without probing |
///
/// Probing creates and removes a small file. A directory created only to be
/// probed is removed again when the probe fails.
pub fn resolve_default_directory() -> PathBuf {
    first_writable(&default_candidates()).unwrap_or_else(current_dir)
}

/// The probed candidates of [`resolve_default_directory`], in priority order
pub fn default_candidates() -> Vec<Candidate> {
    let mut candidates = Vec::new();

    if let Some(root) = local_data_root() {
        candidates.push(Candidate::created(root.join(APP_DIR_NAME)));
    }

    if let Some(exe_dir) = executable_dir() {
        candidates.push(Candidate::created(exe_dir.join("logs")));
        candidates.push(Candidate::existing(exe_dir));
    }

    candidates.push(Candidate::created(current_dir().join("logs")));
    candidates
}

/// Return the first candidate that accepts a probe file
pub fn first_writable(candidates: &[Candidate]) -> Option<PathBuf> {
    candidates.iter().find_map(|candidate| {
        if accept(candidate) {
            tracing::debug!("Using log directory {}", candidate.path.display());
            Some(candidate.path.clone())
        } else {
            tracing::debug!("Skipping log directory {}", candidate.path.display());
            None
        }
    })
}

fn accept(candidate: &Candidate) -> bool {
    let path = &candidate.path;
    let mut created = false;

    if !path.is_dir() {
        if !candidate.create || fs::create_dir(path).is_err() {
            return false;
        }
        created = true;
    }

    if probe_writable(path) {
        return true;
    }

    if created {
        if let Err(e) = fs::remove_dir(path) {
            tracing::warn!("Failed to remove probe directory {}: {}", path.display(), e);
        }
    }
    false
}

/// Check write access by creating, writing and deleting a uniquely named file
pub fn probe_writable(dir: &Path) -> bool {
    let probe = dir.join(format!("temp_{}.tmp", Uuid::new_v4().simple()));

    let written = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
        .and_then(|mut file| file.write_all(b"test"));

    if probe.exists() {
        let _ = fs::remove_file(&probe);
    }

    written.is_ok()
}

/// Default log name: the file stem of the running executable
pub fn default_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| {
            exe.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .filter(|dir| dir.is_dir())
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(windows)]
fn local_data_root() -> Option<PathBuf> {
    let local = dirs::data_local_dir()?;
    // %USERPROFILE%\AppData\LocalLow sits next to %LOCALAPPDATA%
    let low = local.parent().map(|appdata| appdata.join("LocalLow"));
    match low {
        Some(low) if low.is_dir() => Some(low),
        _ => Some(local),
    }
}

#[cfg(not(windows))]
fn local_data_root() -> Option<PathBuf> {
    dirs::data_local_dir().filter(|dir| dir.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_probe_writable_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(probe_writable(temp_dir.path()));
        assert_eq!(entries(temp_dir.path()), 0);
    }

    #[test]
    fn test_probe_missing_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!probe_writable(&temp_dir.path().join("missing")));
    }

    #[test]
    fn test_first_writable_creates_dir() {
        let temp_dir = TempDir::new().unwrap();
        let logs = temp_dir.path().join("logs");

        let found = first_writable(&[Candidate::created(logs.clone())]);

        assert_eq!(found, Some(logs.clone()));
        assert!(logs.is_dir());
        assert_eq!(entries(&logs), 0);
    }

    #[test]
    fn test_first_writable_skips_uncreatable() {
        let temp_dir = TempDir::new().unwrap();
        // Parent is missing, single-level creation must fail
        let deep = temp_dir.path().join("a").join("b");
        let fallback = temp_dir.path().join("fallback");

        let found = first_writable(&[
            Candidate::created(deep.clone()),
            Candidate::created(fallback.clone()),
        ]);

        assert_eq!(found, Some(fallback));
        assert!(!temp_dir.path().join("a").exists());
    }

    #[test]
    fn test_first_writable_skips_missing_existing_only() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("not-created");

        let found = first_writable(&[Candidate::existing(missing.clone())]);

        assert_eq!(found, None);
        assert!(!missing.exists());
    }

    #[test]
    fn test_first_writable_skips_file_candidate() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let found = first_writable(&[
            Candidate::created(file.clone()),
            Candidate::existing(temp_dir.path().to_path_buf()),
        ]);

        assert_eq!(found, Some(temp_dir.path().to_path_buf()));
        assert!(file.is_file());
    }

    #[test]
    fn test_default_candidates_end_with_cwd_logs() {
        let candidates = default_candidates();
        let last = candidates.last().unwrap();
        assert!(last.create);
        assert_eq!(last.path, current_dir().join("logs"));
    }

    #[test]
    fn test_resolve_default_directory_is_a_directory() {
        let dir = resolve_default_directory();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_default_name_not_empty() {
        assert!(!default_name().trim().is_empty());
    }
}
