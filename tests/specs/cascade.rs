// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cascading scopes and the toxic filter, end to end on disk.

use cm_core::test_support::{bullet_with_id, playbook_with};
use cm_core::{Clock, FakeClock};
use cm_storage::paths::repo_playbook_path;
use cm_storage::{append_toxic, PlaybookStore, ToxicEntry};
use tempfile::tempdir;

#[test]
fn repo_overlay_wins_by_id_and_patterns_concatenate() {
    let dir = tempdir().unwrap();
    let global_path = dir.path().join("playbook.yaml");
    let repo = dir.path().join("repo");
    let clock = FakeClock::new();

    let mut global = playbook_with(vec![
        bullet_with_id("blt-shared", "global wording of the shared rule"),
        bullet_with_id("blt-global-only", "applies everywhere"),
    ]);
    global.deprecated_patterns.push(cm_core::DeprecatedPattern {
        pattern: "global-bad".to_string(),
        reason: None,
        replacement: None,
    });
    let store = PlaybookStore::at(&global_path).with_repo(&repo);
    store.save_to(&global_path, &mut global, clock.now()).unwrap();

    let mut overlay = playbook_with(vec![
        bullet_with_id("blt-shared", "repo wording of the shared rule"),
        bullet_with_id("blt-repo-only", "applies in this repo"),
    ]);
    overlay.deprecated_patterns.push(cm_core::DeprecatedPattern {
        pattern: "repo-bad".to_string(),
        reason: None,
        replacement: None,
    });
    let overlay_path = repo_playbook_path(&repo);
    store.save_to(&overlay_path, &mut overlay, clock.now()).unwrap();

    let merged = store.load_merged().unwrap();
    assert_eq!(
        merged.find_bullet("blt-shared").unwrap().content,
        "repo wording of the shared rule"
    );
    assert!(merged.contains("blt-global-only"));
    assert!(merged.contains("blt-repo-only"));
    let patterns: Vec<_> =
        merged.deprecated_patterns.iter().map(|p| p.pattern.as_str()).collect();
    assert_eq!(patterns, vec!["global-bad", "repo-bad"]);
}

#[test]
fn toxic_entry_suppresses_near_duplicates_across_the_cascade() {
    let dir = tempdir().unwrap();
    let global_path = dir.path().join("playbook.yaml");
    let toxic_path = dir.path().join("toxic_bullets.log");
    let clock = FakeClock::new();

    let store = PlaybookStore::at(&global_path).with_toxic_log(&toxic_path);
    let mut playbook = playbook_with(vec![
        bullet_with_id("blt-bad", "use global state EVERYWHERE!"),
        bullet_with_id("blt-fine", "inject dependencies through constructors"),
    ]);
    store.save_to(&global_path, &mut playbook, clock.now()).unwrap();

    append_toxic(
        &toxic_path,
        &ToxicEntry {
            id: "blt-bad".to_string(),
            content: "Use global state everywhere".to_string(),
            reason: Some("user said never again".to_string()),
            forgotten_at: clock.now(),
        },
    )
    .unwrap();

    // Suppressed in the merged view
    let merged = store.load_merged().unwrap();
    assert!(!merged.contains("blt-bad"));
    assert!(merged.contains("blt-fine"));

    // Still present in the file itself
    let raw = store.load_global().unwrap();
    assert!(raw.contains("blt-bad"));
}

#[test]
fn corrupt_global_playbook_quarantines_and_continues() {
    let dir = tempdir().unwrap();
    let global_path = dir.path().join("playbook.yaml");
    std::fs::write(&global_path, ":\n  - definitely: [not, valid").unwrap();

    let store = PlaybookStore::at(&global_path);
    let merged = store.load_merged().unwrap();
    assert!(merged.bullets.is_empty());

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains(".backup."))
        .collect();
    assert_eq!(backups.len(), 1);
}
