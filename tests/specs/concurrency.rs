// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrent writers against one playbook file: the advisory lock must
//! serialize load-mutate-save cycles so no feedback event is lost.

use cm_core::test_support::{bullet_with_id, playbook_with};
use cm_core::{Clock, FakeClock, FeedbackType};
use cm_engine::{record_feedback, FeedbackOptions};
use cm_storage::PlaybookStore;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn concurrent_feedback_preserves_every_event() {
    let dir = tempdir().unwrap();
    let path = Arc::new(dir.path().join("playbook.yaml"));
    let store = PlaybookStore::at(&*path);
    let clock = FakeClock::new();

    let mut seeded = playbook_with(vec![bullet_with_id("blt-shared", "the contested rule")]);
    store.save_to(&path, &mut seeded, clock.now()).unwrap();

    let writers = 4;
    let events_each = 5;
    let mut handles = Vec::new();
    for _ in 0..writers {
        let path = Arc::clone(&path);
        let clock = clock.clone();
        handles.push(std::thread::spawn(move || {
            let store = PlaybookStore::at(&*path);
            for _ in 0..events_each {
                store
                    .mutate(&path, clock.now(), |pb| {
                        record_feedback(
                            pb,
                            "blt-shared",
                            FeedbackType::Helpful,
                            FeedbackOptions::default(),
                            clock.now(),
                        );
                    })
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let pb = store.load_global().unwrap();
    let bullet = pb.find_bullet("blt-shared").unwrap();
    assert_eq!(bullet.feedback_events.len(), writers * events_each);
    assert_eq!(bullet.helpful_count as usize, writers * events_each);
    assert!(bullet.counters_consistent());

    // All locks released
    assert!(!dir.path().join("playbook.yaml.lock").exists());
}

#[test]
fn two_interleaved_with_lock_writers_serialize() {
    let dir = tempdir().unwrap();
    let target = Arc::new(dir.path().join("playbook.yaml"));
    std::fs::write(&*target, "").unwrap();

    let barrier = Arc::new(std::sync::Barrier::new(2));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let target = Arc::clone(&target);
        let barrier = Arc::clone(&barrier);
        handles.push(std::thread::spawn(move || {
            barrier.wait();
            for _ in 0..10 {
                cm_storage::with_lock(&target, || {
                    let text = std::fs::read_to_string(&*target).unwrap();
                    let n = text.trim().parse::<u64>().unwrap_or(0);
                    std::fs::write(&*target, format!("{}", n + 1)).unwrap();
                })
                .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let text = std::fs::read_to_string(&*target).unwrap();
    assert_eq!(text.trim().parse::<u64>().unwrap(), 20);
}
