use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Barrier};
use std::thread;

use rotalog::logging::{LogTarget, TIMESTAMP_FORMAT};
use rotalog::{open, Log};
use tempfile::TempDir;

fn run(dir: &Path, retention: usize, message: &str) {
    let log = open(Some(dir.to_path_buf()), Some("T".to_string()), retention).unwrap();
    log.detail("Default Retention: header").unwrap();
    log.message(message).unwrap();
}

/// Message texts of a log file, without timestamps and header lines
fn messages(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| {
            let (ts, rest) = line.split_once('|').unwrap();
            assert!(chrono::NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok());
            rest.to_string()
        })
        .filter(|rest| !rest.starts_with("DETAIL "))
        .map(|rest| rest.strip_prefix(' ').unwrap().to_string())
        .collect()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn ten_runs_keep_last_four() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("log");

    for i in 0..10 {
        run(&dir, 4, &format!("Iteration {}", i));
        assert!(dir.is_dir());
    }

    assert_eq!(file_names(&dir), vec!["T.1.log", "T.2.log", "T.3.log", "T.log"]);
    let target = LogTarget::new(&dir, "T", 4).unwrap();
    assert_eq!(messages(&target.file_path(0)), vec!["Iteration 9"]);
    assert_eq!(messages(&target.file_path(1)), vec!["Iteration 8"]);
    assert_eq!(messages(&target.file_path(2)), vec!["Iteration 7"]);
    assert_eq!(messages(&target.file_path(3)), vec!["Iteration 6"]);
}

#[test]
fn rotation_is_bounded_for_any_retention() {
    for retention in 2..=6 {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("log");
        let runs = retention + 3;

        for n in 0..runs {
            run(&dir, retention, &format!("cycle {}", n));
        }

        let target = LogTarget::new(&dir, "T", retention).unwrap();
        assert_eq!(file_names(&dir).len(), retention);
        for k in 0..retention {
            let expected = format!("cycle {}", runs - 1 - k);
            assert_eq!(messages(&target.file_path(k)), vec![expected]);
        }
    }
}

#[test]
fn first_run_produces_only_current_file() {
    let temp_dir = TempDir::new().unwrap();
    let dir: PathBuf = temp_dir.path().join("fresh");

    run(&dir, 10, "only");

    assert_eq!(file_names(&dir), vec!["T.log"]);
}

#[test]
fn writer_survives_rotation_by_later_logger() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("log");

    run(&dir, 4, "Run 0 Prep");
    let first = open(Some(dir.clone()), Some("T".to_string()), 4).unwrap();
    first.message("First").unwrap();

    run(&dir, 4, "Second");
    first.message("First again").unwrap();
    drop(first);

    let target = LogTarget::new(&dir, "T", 4).unwrap();
    assert_eq!(file_names(&dir).len(), 3);
    assert_eq!(messages(&target.file_path(0)), vec!["Second"]);
    assert_eq!(messages(&target.file_path(1)), vec!["First", "First again"]);
    assert_eq!(messages(&target.file_path(2)), vec!["Run 0 Prep"]);
}

/// Every file of the family holds exactly one message starting with `prefix`,
/// and no such message appears in two files
fn assert_one_starter_per_file(dir: &Path, retention: usize, starters: usize, prefix: &str) {
    let target = LogTarget::new(dir, "T", retention).unwrap();
    assert_eq!(file_names(dir).len(), starters.min(retention));

    let mut seen = Vec::new();
    for k in 0..starters.min(retention) {
        let own: Vec<String> = messages(&target.file_path(k))
            .into_iter()
            .filter(|m| m.starts_with(prefix))
            .collect();
        assert_eq!(own.len(), 1, "file {} holds {:?}", k, own);
        assert!(!seen.contains(&own[0]));
        seen.push(own[0].clone());
    }
}

#[test]
fn simultaneous_starts_each_get_their_own_file() {
    for (starters, retention) in [(3, 5), (8, 4)] {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("log");
        let start = Arc::new(Barrier::new(starters));
        let written = Arc::new(Barrier::new(starters));

        let handles: Vec<_> = (0..starters)
            .map(|n| {
                let dir = dir.clone();
                let start = Arc::clone(&start);
                let written = Arc::clone(&written);
                thread::spawn(move || {
                    start.wait();
                    let log = open(Some(dir), Some("T".to_string()), retention).unwrap();
                    log.message(&format!("starter {}", n)).unwrap();
                    // Keep every logger open until all have written
                    written.wait();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_one_starter_per_file(&dir, retention, starters, "starter ");
    }
}

#[test]
fn simultaneous_processes_each_get_their_own_file() {
    const PROCESSES: usize = 6;
    const RETENTION: usize = 4;

    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("log");

    let children: Vec<_> = (0..PROCESSES)
        .map(|n| {
            Command::new(env!("CARGO_BIN_EXE_rotalog"))
                .arg("--dir")
                .arg(&dir)
                .args(["--name", "T", "--quiet", "--retention"])
                .arg(RETENTION.to_string())
                .arg(format!("child {}", n))
                .spawn()
                .unwrap()
        })
        .collect();
    for mut child in children {
        assert!(child.wait().unwrap().success());
    }

    assert_one_starter_per_file(&dir, RETENTION, PROCESSES, "Arg: child ");
    let target = LogTarget::new(&dir, "T", RETENTION).unwrap();
    for k in 0..RETENTION {
        assert_eq!(messages(&target.file_path(k)).last().map(String::as_str), Some("Done."));
    }
}
