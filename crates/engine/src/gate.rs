// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evidence gate: cheap pre-LLM acceptance/rejection of proposed bullets
//! using historical success/failure signals.
//!
//! Snippet classification is word-boundary anchored on purpose: generic
//! substring matching produces false positives like "fixed-width".

use cm_adapters::{HistoryAdapter, HistoryError, SearchOpts};
use cm_core::similarity::extract_keywords;
use cm_core::{BulletState, Config};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// Hits fetched per gate evaluation.
const GATE_SEARCH_LIMIT: usize = 20;
/// Auto-accept needs at least this many success sessions and zero failures.
const AUTO_ACCEPT_SUCCESSES: usize = 5;
/// Auto-reject needs at least this many failure sessions and zero successes.
const AUTO_REJECT_FAILURES: usize = 3;

const SUCCESS_PATTERNS: &[&str] = &[
    r"(?i)\bfixed\s+(?:the|a|an|this|that|it)\b",
    r"(?i)\bsuccessfully\b",
    r"(?i)\bsolved\s+(?:the|a|an|this|that|it)\b",
    r"(?i)\bworks\s+(?:now|correctly|properly)\b",
    r"(?i)\bresolved\b",
    r"(?i)\bworking\s+now\b",
];

const FAILURE_PATTERNS: &[&str] = &[
    r"(?i)\bfailed\s+(?:to|with)\b",
    r"(?i)\berror:",
    r"(?i)\b(?:threw|throws)\b[^.\n]{0,60}\berrors?\b",
    r"(?i)\bbroken\b",
    r"(?i)\bcrash(?:ed|es|ing)?\b",
    r"(?i)\bbug\s+(?:in|found|caused)\b",
    r"(?i)\bdoesn'?t\s+work\b",
];

fn success_res() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| SUCCESS_PATTERNS.iter().filter_map(|p| Regex::new(p).ok()).collect())
}

fn failure_res() -> &'static Vec<Regex> {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| FAILURE_PATTERNS.iter().filter_map(|p| Regex::new(p).ok()).collect())
}

/// Classification of one snippet.
fn classify(snippet: &str) -> (bool, bool) {
    let success = success_res().iter().any(|re| re.is_match(snippet));
    let failure = failure_res().iter().any(|re| re.is_match(snippet));
    (success, failure)
}

/// What the gate decided, and on what evidence.
#[derive(Debug, Clone, Serialize)]
pub struct GateDecision {
    pub passed: bool,
    pub reason: String,
    pub suggested_state: BulletState,
    pub session_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

impl GateDecision {
    fn pass(reason: impl Into<String>, state: BulletState) -> Self {
        Self {
            passed: true,
            reason: reason.into(),
            suggested_state: state,
            session_count: 0,
            success_count: 0,
            failure_count: 0,
        }
    }

    /// Only the ambiguous middle of the decision table goes to the validator.
    pub fn needs_validator(&self) -> bool {
        self.passed && self.reason.starts_with("ambiguous")
    }
}

/// Evaluate a candidate bullet against historical evidence.
pub async fn evaluate_gate(
    history: &dyn HistoryAdapter,
    config: &Config,
    content: &str,
) -> GateDecision {
    let keywords = extract_keywords(content, 6);
    if keywords.is_empty() {
        return GateDecision::pass("no keywords to search (fail-open)", BulletState::Draft);
    }
    let query = keywords.join(" ");
    let opts = SearchOpts {
        limit: GATE_SEARCH_LIMIT,
        days: config.validation_lookback_days(),
        agent: None,
        workspace: None,
    };

    let hits = match history.search(&query, &opts).await {
        Ok(hits) => hits,
        Err(HistoryError::Unavailable) | Err(HistoryError::Timeout) => {
            // Never auto-accept without evidence; fail open to draft
            return GateDecision::pass(
                "skipping evidence gate: history unavailable (fail-open)",
                BulletState::Draft,
            );
        }
        Err(e) => {
            debug!(error = %e, "gate search failed");
            return GateDecision::pass(
                "skipping evidence gate: search failed (fail-open)",
                BulletState::Draft,
            );
        }
    };

    // Aggregate per distinct session
    let mut sessions: HashMap<&str, (bool, bool)> = HashMap::new();
    for hit in &hits {
        let (success, failure) = classify(&hit.snippet);
        let entry = sessions.entry(hit.source_path.as_str()).or_insert((false, false));
        entry.0 |= success;
        entry.1 |= failure;
    }
    let session_count = sessions.len();
    let success_count = sessions.values().filter(|(s, _)| *s).count();
    let failure_count = sessions.values().filter(|(_, f)| *f).count();

    let mut decision = if session_count == 0 {
        GateDecision::pass("no historical evidence", BulletState::Draft)
    } else if success_count >= AUTO_ACCEPT_SUCCESSES && failure_count == 0 {
        GateDecision::pass("strong success history (auto-accept)", BulletState::Active)
    } else if failure_count >= AUTO_REJECT_FAILURES && success_count == 0 {
        GateDecision {
            passed: false,
            reason: "consistent failure history (auto-reject)".to_string(),
            suggested_state: BulletState::Draft,
            session_count: 0,
            success_count: 0,
            failure_count: 0,
        }
    } else {
        GateDecision::pass("ambiguous evidence; defer to validator", BulletState::Draft)
    };
    decision.session_count = session_count;
    decision.success_count = success_count;
    decision.failure_count = failure_count;

    debug!(
        query,
        sessions = session_count,
        successes = success_count,
        failures = failure_count,
        passed = decision.passed,
        "evidence gate"
    );
    decision
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
