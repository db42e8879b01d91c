// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-decayed scoring and the maturity state machine.
//!
//! Feedback events lose weight with a configurable half-life; harmful
//! evidence is multiplied so trust degrades much faster than it grows.
//! Everything here is pure; callers pass `now` explicitly.

use crate::bullet::{Bullet, BulletKind, BulletType, FeedbackType, Maturity, NewBullet};
use crate::config::ScoringConfig;
use chrono::{DateTime, Utc};

/// Decayed helpful/harmful sums for one bullet at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DecayedCounts {
    pub helpful: f64,
    pub harmful: f64,
}

impl DecayedCounts {
    pub fn total(&self) -> f64 {
        self.helpful + self.harmful
    }

    /// Fraction of decayed evidence that is harmful; 0 when there is none.
    pub fn harmful_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0.0 {
            0.0
        } else {
            self.harmful / total
        }
    }
}

/// Weight of a single event aged `age_days`: `0.5^(age/half_life)`.
///
/// Future timestamps clamp to the present (age 0, weight 1). A non-positive
/// half-life disables decay.
pub fn decayed_weight(age_days: f64, half_life_days: f64) -> f64 {
    if half_life_days <= 0.0 {
        return 1.0;
    }
    0.5f64.powf(age_days.max(0.0) / half_life_days)
}

/// Sum event weights per type using the bullet's half-life override when
/// present, the config default otherwise.
pub fn decayed_counts(bullet: &Bullet, now: DateTime<Utc>, config: &ScoringConfig) -> DecayedCounts {
    let half_life =
        bullet.confidence_decay_half_life_days.unwrap_or(config.decay_half_life_days);
    let mut counts = DecayedCounts::default();
    for event in &bullet.feedback_events {
        let age_days = (now - event.timestamp).num_seconds() as f64 / 86_400.0;
        let weight = decayed_weight(age_days, half_life);
        match event.event_type {
            FeedbackType::Helpful => counts.helpful += weight,
            FeedbackType::Harmful => counts.harmful += weight,
        }
    }
    counts
}

/// `helpful − harmful_multiplier · harmful`.
pub fn raw_score(counts: &DecayedCounts, config: &ScoringConfig) -> f64 {
    counts.helpful - config.harmful_multiplier * counts.harmful
}

pub fn maturity_multiplier(maturity: Maturity) -> f64 {
    match maturity {
        Maturity::Candidate => 0.5,
        Maturity::Established => 1.0,
        Maturity::Proven => 1.5,
        Maturity::Deprecated => 0.0,
    }
}

/// Raw score weighted by the bullet's maturity tier.
pub fn effective_score(bullet: &Bullet, now: DateTime<Utc>, config: &ScoringConfig) -> f64 {
    let counts = decayed_counts(bullet, now, config);
    raw_score(&counts, config) * maturity_multiplier(bullet.maturity)
}

/// The maturity FSM: where the evidence says this bullet belongs.
pub fn next_maturity(bullet: &Bullet, counts: &DecayedCounts, config: &ScoringConfig) -> Maturity {
    if bullet.maturity == Maturity::Deprecated || bullet.deprecated {
        return Maturity::Deprecated;
    }
    let total = counts.total();
    let ratio = counts.harmful_ratio();
    if ratio > 0.3 && total > config.min_feedback_for_active {
        Maturity::Deprecated
    } else if total < config.min_feedback_for_active {
        Maturity::Candidate
    } else if counts.helpful >= config.min_helpful_for_proven
        && ratio < config.max_harmful_ratio_for_proven
    {
        Maturity::Proven
    } else {
        Maturity::Established
    }
}

/// Promotion guard: the FSM may only move a bullet up the ladder here.
/// `proven` and `deprecated` are sinks for promotion; regression happens via
/// [`evaluate_demotion`] alone.
pub fn evaluate_promotion(
    bullet: &Bullet,
    counts: &DecayedCounts,
    config: &ScoringConfig,
) -> Option<Maturity> {
    let target = next_maturity(bullet, counts, config);
    match (bullet.maturity.rank(), target.rank()) {
        (Some(from), Some(to)) if to > from => Some(target),
        _ => None,
    }
}

/// What demotion, if any, the effective score calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demotion {
    Unchanged,
    /// Step one level down the ladder.
    Demote(Maturity),
    /// Effective score below the prune threshold: retire outright.
    AutoDeprecate,
}

/// Pinned bullets are exempt from both demotion outcomes.
pub fn evaluate_demotion(bullet: &Bullet, now: DateTime<Utc>, config: &ScoringConfig) -> Demotion {
    if bullet.pinned || !bullet.is_active() {
        return Demotion::Unchanged;
    }
    let effective = effective_score(bullet, now, config);
    if effective < -config.prune_harmful_threshold {
        Demotion::AutoDeprecate
    } else if effective < 0.0 {
        match bullet.maturity {
            Maturity::Proven => Demotion::Demote(Maturity::Established),
            Maturity::Established => Demotion::Demote(Maturity::Candidate),
            Maturity::Candidate | Maturity::Deprecated => Demotion::Unchanged,
        }
    } else {
        Demotion::Unchanged
    }
}

/// No events and older than `stale_days`, or last event older than
/// `stale_days`.
pub fn is_stale(bullet: &Bullet, now: DateTime<Utc>, stale_days: u32) -> bool {
    let limit = i64::from(stale_days) * 86_400;
    match bullet.last_event_at() {
        Some(last) => (now - last).num_seconds() > limit,
        None => (now - bullet.created_at).num_seconds() > limit,
    }
}

/// Inversion trigger: enough harmful evidence, clearly dominating helpful.
/// Pinned bullets and existing anti-patterns never invert.
pub fn should_invert(bullet: &Bullet, counts: &DecayedCounts) -> bool {
    !bullet.pinned
        && bullet.is_active()
        && !bullet.is_anti_pattern()
        && counts.harmful >= 3.0
        && counts.harmful > 2.0 * counts.helpful
}

/// Build the replacement anti-pattern for a harmful bullet. The new bullet
/// starts as a candidate and takes the config half-life, not the original's.
pub fn invert_bullet(
    original: &Bullet,
    reason: &str,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> Bullet {
    let stripped = original.content.trim().trim_end_matches('.');
    let mut inverted = Bullet::create(
        NewBullet {
            content: format!("AVOID: {}. {}", stripped, reason),
            category: original.category.clone(),
            kind: Some(BulletKind::AntiPattern),
            tags: original.tags.clone(),
            scope: Some(original.scope),
            scope_key: original.scope_key.clone(),
            workspace: original.workspace.clone(),
            state: None,
        },
        None,
        Some(config.decay_half_life_days),
        now,
    );
    inverted.bullet_type = BulletType::AntiPattern;
    inverted.is_negative = true;
    inverted.source_sessions = original.source_sessions.clone();
    inverted.source_agents = original.source_agents.clone();
    inverted
}

#[cfg(test)]
#[path = "scoring_tests.rs"]
mod tests;
