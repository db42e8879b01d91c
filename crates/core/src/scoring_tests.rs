// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{bullet, bullet_with_feedback};
use crate::{Clock, FakeClock};
use chrono::Duration;
use proptest::prelude::*;
use yare::parameterized;

fn config() -> ScoringConfig {
    ScoringConfig::default()
}

#[test]
fn decay_halves_at_half_life() {
    assert_eq!(decayed_weight(0.0, 90.0), 1.0);
    assert!((decayed_weight(90.0, 90.0) - 0.5).abs() < 1e-12);
    assert!((decayed_weight(180.0, 90.0) - 0.25).abs() < 1e-12);
}

#[test]
fn future_events_clamp_to_now() {
    assert_eq!(decayed_weight(-5.0, 90.0), 1.0);

    let clock = FakeClock::new();
    let now = clock.now();
    let future = now + Duration::days(30);
    let b = bullet_with_feedback("x", &[(FeedbackType::Helpful, future)]);

    let counts = decayed_counts(&b, now, &config());
    assert_eq!(counts.helpful, 1.0);
}

#[test]
fn non_positive_half_life_disables_decay() {
    assert_eq!(decayed_weight(400.0, 0.0), 1.0);
    assert_eq!(decayed_weight(400.0, -1.0), 1.0);
}

#[test]
fn bullet_half_life_overrides_config() {
    let clock = FakeClock::new();
    let now = clock.now();
    let old = now - Duration::days(30);

    let mut b = bullet_with_feedback("x", &[(FeedbackType::Helpful, old)]);
    b.confidence_decay_half_life_days = Some(30.0);

    let counts = decayed_counts(&b, now, &config());
    assert!((counts.helpful - 0.5).abs() < 1e-9);
}

#[test]
fn raw_score_weights_harmful_four_to_one() {
    let counts = DecayedCounts { helpful: 4.0, harmful: 1.0 };
    assert_eq!(raw_score(&counts, &config()), 0.0);
}

#[parameterized(
    candidate = { Maturity::Candidate, 0.5 },
    established = { Maturity::Established, 1.0 },
    proven = { Maturity::Proven, 1.5 },
    deprecated = { Maturity::Deprecated, 0.0 },
)]
fn multiplier_per_tier(maturity: Maturity, expected: f64) {
    assert_eq!(maturity_multiplier(maturity), expected);
}

#[test]
fn effective_score_proven_example() {
    // decayedHelpful = 6, decayedHarmful = 0, proven multiplier 1.5 → 9.0
    let clock = FakeClock::new();
    let now = clock.now();
    let events: Vec<_> = (0..6).map(|_| (FeedbackType::Helpful, now)).collect();
    let mut b = bullet_with_feedback("x", &events);
    b.maturity = Maturity::Proven;

    assert!((effective_score(&b, now, &config()) - 9.0).abs() < 1e-9);
}

#[test]
fn fsm_promotes_candidate_with_clean_evidence_to_proven() {
    let clock = FakeClock::new();
    let now = clock.now();
    let events: Vec<_> = (0..6).map(|_| (FeedbackType::Helpful, now)).collect();
    let b = bullet_with_feedback("x", &events);

    let counts = decayed_counts(&b, now, &config());
    assert_eq!(next_maturity(&b, &counts, &config()), Maturity::Proven);
    assert_eq!(evaluate_promotion(&b, &counts, &config()), Some(Maturity::Proven));
}

#[test]
fn fsm_thin_evidence_stays_candidate() {
    let clock = FakeClock::new();
    let now = clock.now();
    let b = bullet_with_feedback("x", &[(FeedbackType::Helpful, now)]);

    let counts = decayed_counts(&b, now, &config());
    assert_eq!(next_maturity(&b, &counts, &config()), Maturity::Candidate);
    assert_eq!(evaluate_promotion(&b, &counts, &config()), None);
}

#[test]
fn fsm_harmful_ratio_deprecates_but_promotion_guard_blocks() {
    let clock = FakeClock::new();
    let now = clock.now();
    let mut events = vec![(FeedbackType::Harmful, now); 3];
    events.extend(vec![(FeedbackType::Helpful, now); 2]);
    let b = bullet_with_feedback("x", &events);

    let counts = decayed_counts(&b, now, &config());
    // ratio 0.6 > 0.3, total 5 > 3
    assert_eq!(next_maturity(&b, &counts, &config()), Maturity::Deprecated);
    // Deprecated is never reachable via promotion
    assert_eq!(evaluate_promotion(&b, &counts, &config()), None);
}

#[test]
fn fsm_mixed_evidence_is_established() {
    let clock = FakeClock::new();
    let now = clock.now();
    let mut events = vec![(FeedbackType::Helpful, now); 4];
    events.push((FeedbackType::Harmful, now));
    let b = bullet_with_feedback("x", &events);

    let counts = decayed_counts(&b, now, &config());
    // helpful 4 < 5 needed for proven; ratio 0.2 ≤ 0.3
    assert_eq!(next_maturity(&b, &counts, &config()), Maturity::Established);
}

#[test]
fn proven_is_a_promotion_sink() {
    let clock = FakeClock::new();
    let now = clock.now();
    let events: Vec<_> = (0..6).map(|_| (FeedbackType::Helpful, now)).collect();
    let mut b = bullet_with_feedback("x", &events);
    b.maturity = Maturity::Proven;

    let counts = decayed_counts(&b, now, &config());
    assert_eq!(evaluate_promotion(&b, &counts, &config()), None);
}

#[test]
fn demotion_steps_one_level_on_negative_score() {
    let clock = FakeClock::new();
    let now = clock.now();
    let mut b = bullet_with_feedback("x", &[(FeedbackType::Harmful, now)]);
    b.maturity = Maturity::Proven;

    // effective = (0 − 4·1) · 1.5 = −6, below −prune_harmful_threshold
    assert_eq!(evaluate_demotion(&b, now, &config()), Demotion::AutoDeprecate);

    // Softer negative: one harmful far in the past
    let old = now - Duration::days(270);
    let mut b = bullet_with_feedback("x", &[(FeedbackType::Harmful, old)]);
    b.maturity = Maturity::Proven;
    // decayed harmful = 0.125, effective = -0.5·1.5 = -0.75 → demote
    assert_eq!(evaluate_demotion(&b, now, &config()), Demotion::Demote(Maturity::Established));
}

#[test]
fn pinned_bullets_are_exempt_from_demotion() {
    let clock = FakeClock::new();
    let now = clock.now();
    let mut b = bullet_with_feedback("x", &[(FeedbackType::Harmful, now); 5]);
    b.pinned = true;

    assert_eq!(evaluate_demotion(&b, now, &config()), Demotion::Unchanged);
}

#[test]
fn staleness_by_creation_and_by_last_event() {
    let clock = FakeClock::new();
    let created = clock.now();
    let b = bullet("x");

    assert!(!is_stale(&b, created + Duration::days(89), 90));
    assert!(is_stale(&b, created + Duration::days(91), 90));

    let event_at = created + Duration::days(60);
    let b = bullet_with_feedback("x", &[(FeedbackType::Helpful, event_at)]);
    assert!(!is_stale(&b, event_at + Duration::days(89), 90));
    assert!(is_stale(&b, event_at + Duration::days(91), 90));
}

#[test]
fn inversion_boundary_example() {
    // 5 harmful now, 1 helpful 200 days ago, half-life 90d:
    // decayed helpful ≈ 0.214, harmful = 5 ≥ 3 and 5 > 2·0.214 → invert
    let clock = FakeClock::new();
    let now = clock.now();
    let mut events = vec![(FeedbackType::Harmful, now); 5];
    events.push((FeedbackType::Helpful, now - Duration::days(200)));
    let b = bullet_with_feedback("use global state everywhere.", &events);

    let counts = decayed_counts(&b, now, &config());
    assert!((counts.helpful - 0.5f64.powf(200.0 / 90.0)).abs() < 1e-9);
    assert!(should_invert(&b, &counts));

    let inverted = invert_bullet(&b, "Repeatedly caused failures.", &config(), now);
    assert!(inverted.content.starts_with("AVOID: use global state everywhere. "));
    assert_eq!(inverted.kind, BulletKind::AntiPattern);
    assert!(inverted.is_negative);
    assert_eq!(inverted.maturity, Maturity::Candidate);
    // Half-life comes from config, not the original bullet
    assert_eq!(inverted.confidence_decay_half_life_days, Some(90.0));
}

#[test]
fn pinned_and_anti_patterns_never_invert() {
    let clock = FakeClock::new();
    let now = clock.now();
    let counts = DecayedCounts { helpful: 0.0, harmful: 10.0 };

    let mut pinned = bullet_with_feedback("x", &[(FeedbackType::Harmful, now); 10]);
    pinned.pinned = true;
    assert!(!should_invert(&pinned, &counts));

    let mut anti = bullet("AVOID: x");
    anti.kind = BulletKind::AntiPattern;
    anti.is_negative = true;
    assert!(!should_invert(&anti, &counts));
}

proptest! {
    #[test]
    fn decay_weight_is_monotone_in_age(age in 0.0f64..1000.0, older in 0.0f64..1000.0) {
        let (young, old) = if age < older { (age, older) } else { (older, age) };
        prop_assert!(decayed_weight(young, 90.0) >= decayed_weight(old, 90.0));
    }

    #[test]
    fn decay_weight_is_in_unit_interval(age in -100.0f64..10_000.0) {
        let w = decayed_weight(age, 90.0);
        prop_assert!((0.0..=1.0).contains(&w));
    }
}
