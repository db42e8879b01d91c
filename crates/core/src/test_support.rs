// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::bullet::{Bullet, BulletId, FeedbackEvent, FeedbackType, NewBullet};
use crate::clock::{Clock, FakeClock};
use crate::playbook::Playbook;
use chrono::{DateTime, Utc};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for lifecycle types.
pub mod strategies {
    use crate::bullet::{FeedbackType, Maturity};
    use proptest::prelude::*;

    pub fn arb_maturity() -> impl Strategy<Value = Maturity> {
        prop_oneof![
            Just(Maturity::Candidate),
            Just(Maturity::Established),
            Just(Maturity::Proven),
            Just(Maturity::Deprecated),
        ]
    }

    pub fn arb_feedback_type() -> impl Strategy<Value = FeedbackType> {
        prop_oneof![Just(FeedbackType::Helpful), Just(FeedbackType::Harmful)]
    }
}

// ── Factory functions ───────────────────────────────────────────────────────

/// A minimal active bullet with the given content, created at the fake-clock
/// origin.
pub fn bullet(content: &str) -> Bullet {
    Bullet::create(
        NewBullet {
            content: content.to_string(),
            category: "testing".to_string(),
            ..Default::default()
        },
        None,
        None,
        FakeClock::new().now(),
    )
}

/// A bullet with a fixed id, for assertions on identity.
pub fn bullet_with_id(id: &str, content: &str) -> Bullet {
    let mut b = bullet(content);
    b.id = BulletId::from_string(id);
    b
}

/// A bullet carrying the given feedback events, counters consistent.
pub fn bullet_with_feedback(
    content: &str,
    events: &[(FeedbackType, DateTime<Utc>)],
) -> Bullet {
    let mut b = bullet(content);
    for (event_type, timestamp) in events {
        b.record_feedback(FeedbackEvent::new(*event_type, *timestamp));
    }
    b
}

/// A playbook holding exactly these bullets.
pub fn playbook_with(bullets: Vec<Bullet>) -> Playbook {
    let mut pb = Playbook::named("test");
    pb.bullets = bullets;
    pb
}
