// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn add_serializes_with_op_tag() {
    let delta = PlaybookDelta::Add {
        bullet: NewBullet {
            content: "Prefer borrowed slices in hot paths".to_string(),
            category: "rust".to_string(),
            ..Default::default()
        },
        source_session: Some("/sessions/a.jsonl".to_string()),
    };

    let json = serde_json::to_value(&delta).unwrap();
    assert_eq!(json["op"], "add");
    assert_eq!(json["bullet"]["category"], "rust");
}

#[test]
fn deltas_round_trip_through_json() {
    let deltas = vec![
        PlaybookDelta::Helpful {
            bullet_id: "blt-a".to_string(),
            source_session: None,
            context: Some("applied during refactor".to_string()),
        },
        PlaybookDelta::Deprecate {
            bullet_id: "blt-b".to_string(),
            reason: "superseded".to_string(),
            replaced_by: Some("blt-c".to_string()),
        },
        PlaybookDelta::Merge {
            bullet_ids: vec!["blt-d".to_string(), "blt-e".to_string()],
            merged_content: "combined rule".to_string(),
        },
    ];

    let json = serde_json::to_string(&deltas).unwrap();
    let back: Vec<PlaybookDelta> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), 3);
    assert_eq!(back[0].op(), "helpful");
    assert_eq!(back[1].op(), "deprecate");
    assert_eq!(back[2].op(), "merge");
}

#[test]
fn unknown_op_fails_to_parse() {
    let err = serde_json::from_str::<PlaybookDelta>(r#"{"op": "explode"}"#);
    assert!(err.is_err());
}
