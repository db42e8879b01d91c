// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn writes_new_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playbook.yaml");

    atomic_write(&path, b"name: global\n").unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"name: global\n");
    assert!(!dir.path().join("playbook.yaml.tmp").exists());
}

#[test]
fn replaces_existing_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playbook.yaml");
    std::fs::write(&path, "old").unwrap();

    atomic_write(&path, b"new").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
}

#[test]
fn failure_leaves_original_intact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("playbook.yaml");

    // Parent directory does not exist: the write must fail...
    assert!(atomic_write(&path, b"data").is_err());
    // ...and leave nothing behind
    assert!(!path.exists());
}

#[test]
fn failed_rename_cleans_up_temp() {
    let dir = tempdir().unwrap();
    // Renaming over an existing *directory* fails on every platform
    let path = dir.path().join("target");
    std::fs::create_dir(&path).unwrap();

    assert!(atomic_write(&path, b"data").is_err());
    assert!(!dir.path().join("target.tmp").exists());
    assert!(path.is_dir());
}
