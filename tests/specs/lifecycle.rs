// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bullet lifecycle end to end: add, feedback, promotion, inversion,
//! pinning, all against real playbook files.

use chrono::Duration;
use cm_core::test_support::bullet_with_feedback;
use cm_core::{Clock, Config, FakeClock, FeedbackType, Maturity, NewBullet, PlaybookDelta};
use cm_engine::curate;
use cm_storage::PlaybookStore;
use tempfile::tempdir;

#[test]
fn add_feedback_promote_round_trip_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playbook.yaml");
    let store = PlaybookStore::at(&path);
    let clock = FakeClock::new();
    let config = Config::default();

    // Add via curator under the file lock
    let id = store
        .mutate(&path, clock.now(), |pb| {
            curate(
                pb,
                vec![PlaybookDelta::Add {
                    bullet: NewBullet {
                        content: "run the full test suite before tagging a release".to_string(),
                        category: "release".to_string(),
                        ..Default::default()
                    },
                    source_session: None,
                }],
                &config,
                clock.now(),
            );
            pb.bullets[0].id.clone()
        })
        .unwrap();

    // Six helpful events over two weeks, then curate again
    for _ in 0..6 {
        clock.advance_days(2);
        store
            .mutate(&path, clock.now(), |pb| {
                curate(
                    pb,
                    vec![PlaybookDelta::Helpful {
                        bullet_id: id.to_string(),
                        source_session: None,
                        context: None,
                    }],
                    &config,
                    clock.now(),
                );
            })
            .unwrap();
    }

    let pb = store.load_global().unwrap();
    let bullet = pb.find_bullet(&id).unwrap();
    assert_eq!(bullet.helpful_count, 6);
    assert_eq!(bullet.maturity, Maturity::Proven);
    assert!(bullet.counters_consistent());
}

#[test]
fn harmful_storm_inverts_into_anti_pattern_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playbook.yaml");
    let store = PlaybookStore::at(&path);
    let clock = FakeClock::new();
    let config = Config::default();

    // One helpful long ago, five harmful now
    let mut events = vec![(FeedbackType::Helpful, clock.now())];
    clock.advance_days(200);
    events.extend(vec![(FeedbackType::Harmful, clock.now()); 5]);
    let bullet = bullet_with_feedback("mock every dependency in unit tests", &events);
    let original_id = bullet.id.clone();

    store
        .mutate(&path, clock.now(), |pb| {
            pb.bullets.push(bullet.clone());
            curate(pb, Vec::new(), &config, clock.now());
        })
        .unwrap();

    let pb = store.load_global().unwrap();
    let original = pb.find_bullet(&original_id).unwrap();
    assert!(!original.is_active());

    let anti = pb.active_bullets().find(|b| b.is_anti_pattern()).unwrap();
    assert!(anti.content.starts_with("AVOID: mock every dependency in unit tests"));
    assert_eq!(original.replaced_by.as_ref().unwrap(), &anti.id);
    assert_eq!(anti.maturity, Maturity::Candidate);
}

#[test]
fn pinned_bullet_outlives_harmful_feedback() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playbook.yaml");
    let store = PlaybookStore::at(&path);
    let clock = FakeClock::new();
    let config = Config::default();

    store
        .mutate(&path, clock.now(), |pb| {
            let mut bullet = bullet_with_feedback(
                "never commit secrets",
                &[(FeedbackType::Harmful, clock.now()); 10],
            );
            bullet.pinned = true;
            bullet.pinned_reason = Some("policy".to_string());
            pb.bullets.push(bullet);
            curate(pb, Vec::new(), &config, clock.now());
        })
        .unwrap();

    let pb = store.load_global().unwrap();
    assert!(pb.bullets[0].is_active());
    assert!(pb.bullets[0].pinned);
}

#[test]
fn save_load_preserves_everything_but_last_reflection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playbook.yaml");
    let store = PlaybookStore::at(&path);
    let clock = FakeClock::new();

    let id = store
        .mutate(&path, clock.now(), |pb| {
            pb.add_bullet(
                NewBullet {
                    content: "review dependency updates weekly".to_string(),
                    category: "maintenance".to_string(),
                    tags: vec!["deps".to_string()],
                    ..Default::default()
                },
                Some("/sessions/s.jsonl"),
                Some(45.0),
                clock.now(),
            )
        })
        .unwrap();

    let first = store.load_global().unwrap();
    clock.advance(Duration::hours(1));
    let mut second = first.clone();
    store.save_to(&path, &mut second, clock.now()).unwrap();
    let third = store.load_global().unwrap();

    let (a, b) = (first.find_bullet(&id).unwrap(), third.find_bullet(&id).unwrap());
    assert_eq!(a.content, b.content);
    assert_eq!(a.tags, b.tags);
    assert_eq!(a.confidence_decay_half_life_days, b.confidence_decay_half_life_days);
    assert_eq!(a.source_sessions, b.source_sessions);
    assert_eq!(a.created_at, b.created_at);
    // Only the reflection stamp moved
    assert_ne!(first.metadata.last_reflection, third.metadata.last_reflection);
}
