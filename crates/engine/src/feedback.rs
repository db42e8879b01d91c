// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feedback API: recording helpful/harmful events against a playbook.

use chrono::{DateTime, Utc};
use cm_core::{FeedbackEvent, FeedbackType, Playbook};

/// Optional context attached to a feedback event.
#[derive(Debug, Clone, Default)]
pub struct FeedbackOptions {
    /// Event time; defaults to `now` when absent.
    pub timestamp: Option<DateTime<Utc>>,
    pub session_path: Option<String>,
    pub reason: Option<String>,
    pub context: Option<String>,
}

/// Append a feedback event to the bullet with `id`. Updates the denormalized
/// counter, `updated_at`, and (for helpful events) `last_validated_at`.
/// Returns false without mutating anything when the id is unknown.
pub fn record_feedback(
    playbook: &mut Playbook,
    id: &str,
    feedback_type: FeedbackType,
    opts: FeedbackOptions,
    now: DateTime<Utc>,
) -> bool {
    let event = FeedbackEvent {
        event_type: feedback_type,
        timestamp: opts.timestamp.unwrap_or(now),
        session_path: opts.session_path,
        reason: opts.reason,
        context: opts.context,
    };
    playbook.record_feedback(id, event)
}

#[cfg(test)]
#[path = "feedback_tests.rs"]
mod tests;
