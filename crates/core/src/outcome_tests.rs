// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::bullet::FeedbackType;
use crate::{Clock, FakeClock};
use yare::parameterized;

fn record(outcome: OutcomeStatus) -> OutcomeRecord {
    OutcomeRecord {
        session_id: "sess-1".to_string(),
        outcome,
        rules_used: vec!["blt-a".to_string()],
        notes: None,
        duration_sec: None,
        error_count: None,
        had_retries: false,
        sentiment: None,
        recorded_at: FakeClock::new().now(),
        path: "/sessions/s.jsonl".to_string(),
    }
}

#[test]
fn plain_success_is_helpful_weight_one() {
    let signal = record(OutcomeStatus::Success).feedback_signal();
    assert_eq!(signal.feedback_type, FeedbackType::Helpful);
    assert_eq!(signal.weight, 1.0);
}

#[test]
fn plain_failure_is_harmful_weight_one() {
    let signal = record(OutcomeStatus::Failure).feedback_signal();
    assert_eq!(signal.feedback_type, FeedbackType::Harmful);
    assert_eq!(signal.weight, 1.0);
}

#[test]
fn mixed_ties_break_to_helpful_and_clamp_to_floor() {
    let signal = record(OutcomeStatus::Mixed).feedback_signal();
    assert_eq!(signal.feedback_type, FeedbackType::Helpful);
    // 0.1 vs 0.1 tie, clamped floor keeps it at 0.1
    assert_eq!(signal.weight, 0.1);
}

#[test]
fn fast_success_earns_bonus() {
    let mut r = record(OutcomeStatus::Success);
    r.duration_sec = Some(120);
    let signal = r.feedback_signal();
    assert_eq!(signal.feedback_type, FeedbackType::Helpful);
    assert_eq!(signal.weight, 1.5);
}

#[test]
fn fast_failure_gets_no_speed_bonus() {
    let mut r = record(OutcomeStatus::Failure);
    r.duration_sec = Some(120);
    let signal = r.feedback_signal();
    assert_eq!(signal.feedback_type, FeedbackType::Harmful);
    assert_eq!(signal.weight, 1.0);
}

#[parameterized(
    two_errors = { Some(2), 1.7 },
    many_errors = { Some(7), 1.7 },
    one_error = { Some(1), 1.3 },
    no_errors = { Some(0), 1.0 },
)]
fn error_count_penalties(errors: Option<u32>, expected: f64) {
    let mut r = record(OutcomeStatus::Failure);
    r.error_count = errors;
    let signal = r.feedback_signal();
    assert_eq!(signal.feedback_type, FeedbackType::Harmful);
    assert!((signal.weight - expected).abs() < 1e-9);
}

#[test]
fn pile_of_harmful_signals_clamps_to_two() {
    let mut r = record(OutcomeStatus::Failure);
    r.duration_sec = Some(7200);
    r.error_count = Some(4);
    r.had_retries = true;
    r.sentiment = Some(Sentiment::Negative);
    // 1.0 + 0.3 + 0.7 + 0.5 + 0.5 = 3.0 → clamped
    let signal = r.feedback_signal();
    assert_eq!(signal.feedback_type, FeedbackType::Harmful);
    assert_eq!(signal.weight, 2.0);
}

#[test]
fn sentiment_can_flip_a_mixed_outcome_harmful() {
    let mut r = record(OutcomeStatus::Mixed);
    r.sentiment = Some(Sentiment::Negative);
    let signal = r.feedback_signal();
    assert_eq!(signal.feedback_type, FeedbackType::Harmful);
    assert!((signal.weight - 0.6).abs() < 1e-9);
}

#[test]
fn outcome_record_ndjson_round_trips() {
    let mut r = record(OutcomeStatus::Success);
    r.sentiment = Some(Sentiment::Positive);
    r.duration_sec = Some(300);

    let line = serde_json::to_string(&r).unwrap();
    assert!(!line.contains('\n'));
    assert!(line.contains("\"sessionId\":\"sess-1\""));

    let back: OutcomeRecord = serde_json::from_str(&line).unwrap();
    assert_eq!(back.outcome, OutcomeStatus::Success);
    assert_eq!(back.rules_used, vec!["blt-a".to_string()]);
}

#[test]
fn status_parse_accepts_any_case() {
    assert_eq!(OutcomeStatus::parse("Success"), Some(OutcomeStatus::Success));
    assert_eq!(OutcomeStatus::parse("FAILURE"), Some(OutcomeStatus::Failure));
    assert_eq!(OutcomeStatus::parse("mixed"), Some(OutcomeStatus::Mixed));
    assert_eq!(OutcomeStatus::parse("meh"), None);
}
