// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Curator: applies a batch of deltas to a playbook, then runs the lifecycle
//! post-processing (promotions, demotions/auto-prune, inversions).
//!
//! The playbook is mutated in place; the caller is responsible for holding
//! the file lock and persisting afterwards.

use chrono::{DateTime, Utc};
use cm_core::scoring::{self, Demotion};
use cm_core::similarity::{find_similar_bullet, hash_content};
use cm_core::{
    BulletId, Config, FeedbackEvent, FeedbackType, Maturity, Playbook, PlaybookDelta,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::feedback::{record_feedback, FeedbackOptions};

/// A delta that could not be applied, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromotionRecord {
    pub bullet_id: String,
    pub from: Maturity,
    pub to: Maturity,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InversionRecord {
    pub original_id: String,
    pub anti_pattern_id: String,
}

/// What one curator call did.
#[derive(Debug, Default, Serialize)]
pub struct CurationOutcome {
    pub applied: u32,
    pub skipped: u32,
    pub conflicts: Vec<Conflict>,
    pub promotions: Vec<PromotionRecord>,
    pub inversions: Vec<InversionRecord>,
    pub pruned: u32,
}

/// Apply `deltas` to `playbook`, then post-process lifecycle transitions.
pub fn curate(
    playbook: &mut Playbook,
    deltas: Vec<PlaybookDelta>,
    config: &Config,
    now: DateTime<Utc>,
) -> CurationOutcome {
    let mut outcome = CurationOutcome::default();

    for delta in deltas {
        apply_delta(playbook, delta, config, now, &mut outcome);
    }

    post_process(playbook, config, now, &mut outcome);

    info!(
        applied = outcome.applied,
        skipped = outcome.skipped,
        promotions = outcome.promotions.len(),
        inversions = outcome.inversions.len(),
        pruned = outcome.pruned,
        "curated playbook"
    );
    outcome
}

fn apply_delta(
    playbook: &mut Playbook,
    delta: PlaybookDelta,
    config: &Config,
    now: DateTime<Utc>,
    outcome: &mut CurationOutcome,
) {
    let op = delta.op();
    match delta {
        PlaybookDelta::Add { bullet, source_session } => {
            if bullet.content.trim().is_empty() || bullet.category.trim().is_empty() {
                skip(outcome, op, None, "add requires content and category");
                return;
            }
            let hash = hash_content(&bullet.content);
            if playbook
                .active_bullets()
                .any(|b| b.content_hash.as_deref() == Some(hash.as_str())
                    || hash_content(&b.content) == hash)
            {
                skip(outcome, op, None, "duplicate content (hash match)");
                return;
            }
            let threshold = config.dedup_similarity_threshold();
            let similar = find_similar_bullet(&playbook.bullets, &bullet.content, threshold)
                .map(|(b, score)| (b.id.clone(), score));
            match similar {
                Some((id, score)) => {
                    // Near-duplicate: reinforce the existing bullet instead
                    debug!(bullet_id = %id, score, "reinforcing similar bullet");
                    playbook.record_feedback(
                        &id,
                        FeedbackEvent {
                            event_type: FeedbackType::Helpful,
                            timestamp: now,
                            session_path: source_session,
                            reason: None,
                            context: Some("Reinforced by similar insight".to_string()),
                        },
                    );
                    outcome.applied += 1;
                }
                None => {
                    playbook.add_bullet(
                        bullet,
                        source_session.as_deref(),
                        None,
                        now,
                    );
                    outcome.applied += 1;
                }
            }
        }

        PlaybookDelta::Helpful { bullet_id, source_session, context } => {
            let ok = record_feedback(
                playbook,
                &bullet_id,
                FeedbackType::Helpful,
                FeedbackOptions { session_path: source_session, context, ..Default::default() },
                now,
            );
            if ok {
                outcome.applied += 1;
            } else {
                skip(outcome, op, Some(bullet_id), "unknown bullet id");
            }
        }

        PlaybookDelta::Harmful { bullet_id, reason, context, source_session } => {
            let ok = record_feedback(
                playbook,
                &bullet_id,
                FeedbackType::Harmful,
                FeedbackOptions {
                    session_path: source_session,
                    reason,
                    context,
                    ..Default::default()
                },
                now,
            );
            if ok {
                outcome.applied += 1;
            } else {
                skip(outcome, op, Some(bullet_id), "unknown bullet id");
            }
        }

        PlaybookDelta::Replace { bullet_id, new_content } => {
            match playbook.find_bullet_mut(&bullet_id) {
                Some(b) => {
                    b.content = new_content;
                    b.content_hash = Some(hash_content(&b.content));
                    b.updated_at = now;
                    outcome.applied += 1;
                }
                None => skip(outcome, op, Some(bullet_id), "unknown bullet id"),
            }
        }

        PlaybookDelta::Deprecate { bullet_id, reason, replaced_by } => {
            let replaced_by = replaced_by.map(BulletId::from_string);
            if playbook.deprecate_bullet(&bullet_id, &reason, replaced_by, now) {
                outcome.applied += 1;
            } else {
                skip(outcome, op, Some(bullet_id), "unknown bullet id");
            }
        }

        PlaybookDelta::Merge { bullet_ids, merged_content } => {
            let resolved: Vec<BulletId> = bullet_ids
                .iter()
                .filter(|id| playbook.contains(id))
                .map(|id| BulletId::from_string(id.clone()))
                .collect();
            if resolved.len() < 2 {
                skip(outcome, op, None, "merge requires at least two resolvable bullets");
                return;
            }
            // Category inherited from the first source, tags unioned
            let first = match playbook.find_bullet(&resolved[0]) {
                Some(b) => b,
                None => {
                    skip(outcome, op, None, "merge source vanished");
                    return;
                }
            };
            let category = first.category.clone();
            let mut tags: Vec<String> = Vec::new();
            for id in &resolved {
                if let Some(b) = playbook.find_bullet(id) {
                    for tag in &b.tags {
                        if !tags.contains(tag) {
                            tags.push(tag.clone());
                        }
                    }
                }
            }
            let new_id = playbook.add_bullet(
                cm_core::NewBullet {
                    content: merged_content,
                    category,
                    tags,
                    ..Default::default()
                },
                None,
                None,
                now,
            );
            for id in &resolved {
                playbook.deprecate_bullet(
                    id,
                    "merged into replacement",
                    Some(new_id.clone()),
                    now,
                );
            }
            outcome.applied += 1;
        }
    }
}

/// Lifecycle pass, in order: promotions, demotions/auto-prune, inversions.
fn post_process(
    playbook: &mut Playbook,
    config: &Config,
    now: DateTime<Utc>,
    outcome: &mut CurationOutcome,
) {
    // 1. Promotions
    for bullet in &mut playbook.bullets {
        if !bullet.is_active() {
            continue;
        }
        let counts = scoring::decayed_counts(bullet, now, &config.scoring);
        if let Some(to) = scoring::evaluate_promotion(bullet, &counts, &config.scoring) {
            let from = bullet.maturity;
            bullet.maturity = to;
            bullet.updated_at = now;
            outcome.promotions.push(PromotionRecord {
                bullet_id: bullet.id.to_string(),
                from,
                to,
                reason: format!(
                    "decayed helpful {:.2}, harmful {:.2}",
                    counts.helpful, counts.harmful
                ),
            });
        }
    }

    // 2. Demotions and auto-prune. Bullets that qualify for inversion are
    // left alone here so step 3 can turn them into anti-patterns instead of
    // silently discarding the signal.
    let mut to_deprecate: Vec<BulletId> = Vec::new();
    for bullet in &mut playbook.bullets {
        match scoring::evaluate_demotion(bullet, now, &config.scoring) {
            Demotion::Unchanged => {}
            Demotion::Demote(to) => {
                debug!(bullet_id = %bullet.id, from = %bullet.maturity, to = %to, "demoting");
                bullet.maturity = to;
                bullet.updated_at = now;
            }
            Demotion::AutoDeprecate => {
                let counts = scoring::decayed_counts(bullet, now, &config.scoring);
                if !scoring::should_invert(bullet, &counts) {
                    to_deprecate.push(bullet.id.clone());
                }
            }
        }
    }
    for id in to_deprecate {
        playbook.deprecate_bullet(&id, "auto-pruned: harmful evidence", None, now);
        outcome.pruned += 1;
    }

    // 3. Inversions
    let mut inversions: Vec<(BulletId, cm_core::Bullet, String)> = Vec::new();
    for bullet in playbook.bullets.iter() {
        let counts = scoring::decayed_counts(bullet, now, &config.scoring);
        if scoring::should_invert(bullet, &counts) {
            let reason = format!(
                "Repeatedly caused failures ({:.1} harmful vs {:.1} helpful)",
                counts.harmful, counts.helpful
            );
            let inverted = scoring::invert_bullet(bullet, &reason, &config.scoring, now);
            inversions.push((bullet.id.clone(), inverted, reason));
        }
    }
    for (original_id, inverted, reason) in inversions {
        let anti_id = inverted.id.clone();
        playbook.bullets.push(inverted);
        playbook.deprecate_bullet(&original_id, &reason, Some(anti_id.clone()), now);
        outcome.inversions.push(InversionRecord {
            original_id: original_id.to_string(),
            anti_pattern_id: anti_id.to_string(),
        });
    }
}

fn skip(outcome: &mut CurationOutcome, op: &str, bullet_id: Option<String>, reason: &str) {
    debug!(op, bullet_id = bullet_id.as_deref().unwrap_or("-"), reason, "skipping delta");
    outcome.skipped += 1;
    outcome.conflicts.push(Conflict {
        op: op.to_string(),
        bullet_id,
        reason: reason.to_string(),
    });
}

#[cfg(test)]
#[path = "curator_tests.rs"]
mod tests;
