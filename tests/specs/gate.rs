// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evidence-gate boundary behavior, driven through a full reflection cycle.

use cm_adapters::{FakeExtractor, FakeHistory, FakeValidator};
use cm_core::{BulletState, Clock, Config, FakeClock};
use cm_engine::{evaluate_gate, ReflectOptions, Reflector};
use cm_storage::{DataRoot, PlaybookStore};
use tempfile::tempdir;

#[tokio::test]
async fn auto_accept_activates_without_the_validator() {
    let dir = tempdir().unwrap();
    let data_root = DataRoot::at(dir.path());
    let config = Config::default();
    let store = PlaybookStore::at(data_root.playbook_path(&config));
    let clock = FakeClock::new();

    let history = FakeHistory::new();
    // Five distinct sessions, all success-classified, zero failures
    for i in 0..5 {
        history.push_hit(&format!("/h/{}.jsonl", i), "successfully pinned the toolchain");
    }
    history.push_session("2026-01-01", "/s/today.jsonl");
    history.set_export("/s/today.jsonl", "LEARNED: pin the toolchain for reproducible builds\n");

    let extractor = FakeExtractor::new();
    let validator = FakeValidator::new();
    let reflector = Reflector {
        history: &history,
        extractor: &extractor,
        validator: Some(&validator),
        store: &store,
        data_root: &data_root,
        config: &config,
    };

    let summary = reflector.run(&ReflectOptions::default(), clock.now()).await.unwrap();
    assert_eq!(summary.deltas_applied, 1);

    // The validator was never consulted, and the bullet skipped draft
    assert!(validator.calls().is_empty());
    let pb = store.load_global().unwrap();
    assert_eq!(pb.bullets[0].state, BulletState::Active);

    // Gate decision itself reports the expected shape
    let decision = evaluate_gate(&history, &config, "pin the toolchain for builds").await;
    assert!(decision.passed);
    assert_eq!(decision.suggested_state, BulletState::Active);
    assert_eq!(decision.session_count, 5);
    assert_eq!(decision.success_count, 5);
    assert_eq!(decision.failure_count, 0);
}

#[tokio::test]
async fn auto_reject_drops_the_add_entirely() {
    let dir = tempdir().unwrap();
    let data_root = DataRoot::at(dir.path());
    let config = Config::default();
    let store = PlaybookStore::at(data_root.playbook_path(&config));
    let clock = FakeClock::new();

    let history = FakeHistory::new();
    for i in 0..3 {
        history.push_hit(&format!("/h/{}.jsonl", i), "failed to pin the toolchain");
    }
    history.push_session("2026-01-01", "/s/today.jsonl");
    history.set_export("/s/today.jsonl", "LEARNED: pin the toolchain for reproducible builds\n");

    let extractor = FakeExtractor::new();
    let reflector = Reflector {
        history: &history,
        extractor: &extractor,
        validator: None,
        store: &store,
        data_root: &data_root,
        config: &config,
    };

    let summary = reflector.run(&ReflectOptions::default(), clock.now()).await.unwrap();
    assert_eq!(summary.gate_rejected, 1);
    assert_eq!(summary.deltas_applied, 0);
    assert!(store.load_global().unwrap().bullets.is_empty());
}

#[tokio::test]
async fn unavailable_history_fails_open_to_draft_not_active() {
    let config = Config::default();
    let decision =
        evaluate_gate(&FakeHistory::unavailable(), &config, "pin the toolchain").await;

    assert!(decision.passed);
    assert_eq!(decision.suggested_state, BulletState::Draft);
    assert_eq!(decision.session_count, 0);
}
