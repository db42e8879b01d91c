// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tempfile::tempdir;

fn fast_opts() -> LockOptions {
    LockOptions {
        retries: 3,
        retry_delay: Duration::from_millis(5),
        stale_after: Duration::from_secs(30),
    }
}

#[test]
fn acquire_creates_and_drop_removes() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("playbook.yaml");

    let guard = FileLock::acquire(&target).unwrap();
    let lock_path = guard.lock_path().to_path_buf();
    assert!(lock_path.exists());
    assert!(lock_path.to_string_lossy().ends_with("playbook.yaml.lock"));

    drop(guard);
    assert!(!lock_path.exists());
}

#[test]
fn contended_lock_times_out() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("playbook.yaml");

    let _held = FileLock::acquire(&target).unwrap();
    let err = FileLock::acquire_with(&target, &fast_opts()).unwrap_err();
    assert!(matches!(err, LockError::Timeout { .. }));
    let msg = err.to_string();
    assert!(msg.contains("playbook.yaml.lock"), "error names the path: {}", msg);
}

#[test]
fn lock_released_after_contender_gave_up() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("playbook.yaml");

    {
        let _held = FileLock::acquire(&target).unwrap();
        assert!(FileLock::acquire_with(&target, &fast_opts()).is_err());
    }
    // Released; next acquire succeeds immediately
    assert!(FileLock::acquire_with(&target, &fast_opts()).is_ok());
}

#[test]
fn stale_lock_is_taken_over() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("playbook.yaml");
    let lock_path = dir.path().join("playbook.yaml.lock");

    // Simulate a crashed process: lock file with an old mtime
    std::fs::write(&lock_path, "99999\n").unwrap();
    let opts = LockOptions { stale_after: Duration::from_millis(10), ..fast_opts() };
    std::thread::sleep(Duration::from_millis(50));

    let guard = FileLock::acquire_with(&target, &opts).unwrap();
    assert!(guard.lock_path().exists());
}

#[test]
fn fresh_lock_is_not_stolen() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("playbook.yaml");

    let _held = FileLock::acquire(&target).unwrap();
    // Default staleness (30s) far exceeds test runtime
    let err = FileLock::acquire_with(&target, &fast_opts()).unwrap_err();
    assert!(matches!(err, LockError::Timeout { .. }));
}

#[test]
fn missing_parent_directory_is_created() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("deep/nested/playbook.yaml");

    let guard = FileLock::acquire_with(&target, &fast_opts()).unwrap();
    assert!(guard.lock_path().exists());
}

#[test]
fn release_tolerates_missing_lock_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("playbook.yaml");

    let guard = FileLock::acquire(&target).unwrap();
    std::fs::remove_file(guard.lock_path()).unwrap();
    drop(guard); // must not panic
}

#[test]
fn with_lock_runs_op_and_releases() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("playbook.yaml");

    let out = with_lock(&target, || 41 + 1).unwrap();
    assert_eq!(out, 42);
    assert!(!dir.path().join("playbook.yaml.lock").exists());
}

#[test]
fn interleaved_writers_serialize() {
    use std::sync::Arc;

    let dir = tempdir().unwrap();
    let target = Arc::new(dir.path().join("counter"));
    std::fs::write(&*target, "0").unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let target = Arc::clone(&target);
        handles.push(std::thread::spawn(move || {
            for _ in 0..10 {
                with_lock(&target, || {
                    let n: u64 =
                        std::fs::read_to_string(&*target).unwrap().trim().parse().unwrap();
                    std::fs::write(&*target, format!("{}", n + 1)).unwrap();
                })
                .unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let n: u64 = std::fs::read_to_string(&*target).unwrap().trim().parse().unwrap();
    assert_eq!(n, 40);
}
