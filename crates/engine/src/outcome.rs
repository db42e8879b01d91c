// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome applier: append the record to the outcome log, then translate it
//! into one feedback event per cited rule.
//!
//! Rules are resolved to their owning playbook file first (repo overlay
//! preferred over global), grouped per file, and applied under one lock per
//! file, taken in ascending lexicographic path order.

use chrono::{DateTime, Utc};
use cm_core::{FeedbackType, OutcomeRecord};
use cm_storage::{append_outcome, PlaybookStore, StoreError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::feedback::{record_feedback, FeedbackOptions};

#[derive(Debug, Error)]
pub enum OutcomeError {
    #[error("failed to append outcome log: {0}")]
    Log(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What applying one outcome did.
#[derive(Debug, Serialize)]
pub struct AppliedOutcome {
    pub feedback_type: FeedbackType,
    pub weight: f64,
    pub events_applied: u32,
    pub unknown_rules: Vec<String>,
}

/// Record `record` in the outcome log and apply its feedback to every cited
/// rule.
pub fn apply_outcome(
    store: &PlaybookStore,
    outcomes_path: &Path,
    record: &OutcomeRecord,
    now: DateTime<Utc>,
) -> Result<AppliedOutcome, OutcomeError> {
    append_outcome(outcomes_path, record)?;

    let signal = record.feedback_signal();
    let mut applied = AppliedOutcome {
        feedback_type: signal.feedback_type,
        weight: signal.weight,
        events_applied: 0,
        unknown_rules: Vec::new(),
    };

    // Group rules by owning file; BTreeMap iterates in lexicographic path
    // order, which is also the required lock order.
    let mut per_file: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for rule_id in &record.rules_used {
        let path = store.owner_path(rule_id)?;
        per_file.entry(path).or_default().push(rule_id.clone());
    }

    let context = format!(
        "outcome {} for session {} (weight {:.1})",
        record.outcome, record.session_id, signal.weight
    );

    for (path, rule_ids) in per_file {
        let (ok_ids, missing): (Vec<String>, Vec<String>) = store.mutate(&path, now, |pb| {
            let mut ok = Vec::new();
            let mut missing = Vec::new();
            for rule_id in rule_ids {
                let recorded = record_feedback(
                    pb,
                    &rule_id,
                    signal.feedback_type,
                    FeedbackOptions {
                        session_path: Some(record.path.clone()),
                        context: Some(context.clone()),
                        ..Default::default()
                    },
                    now,
                );
                if recorded {
                    ok.push(rule_id);
                } else {
                    missing.push(rule_id);
                }
            }
            (ok, missing)
        })?;
        applied.events_applied += ok_ids.len() as u32;
        applied.unknown_rules.extend(missing);
    }

    info!(
        session = %record.session_id,
        outcome = %record.outcome,
        feedback = %signal.feedback_type,
        applied = applied.events_applied,
        "applied outcome"
    );
    Ok(applied)
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
