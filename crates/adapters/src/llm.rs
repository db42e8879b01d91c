// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LLM collaborator seams: rule validation and diary extraction.
//!
//! This workspace never calls a model itself; providers are wired in by the
//! embedding CLI. The traits keep the engine testable and let `reflect
//! --offline` run against the fakes.

use async_trait::async_trait;
use cm_core::{DiaryEntry, SessionMeta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm provider unavailable: {0}")]
    Unavailable(String),
    #[error("llm provider failed: {0}")]
    Provider(String),
}

/// Validator verdict classes, as the provider reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictKind {
    Accept,
    Reject,
    AcceptWithCaution,
    Refine,
}

/// Validation result for one candidate rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub valid: bool,
    pub verdict: VerdictKind,
    /// Provider confidence in [0, 1].
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_refinement: Option<String>,
}

impl Verdict {
    /// Normalize provider quirks: a `REFINE` verdict becomes accept-with-
    /// caution at 0.8× confidence.
    pub fn normalized(mut self) -> Self {
        if self.verdict == VerdictKind::Refine {
            self.verdict = VerdictKind::AcceptWithCaution;
            self.valid = true;
            self.confidence *= 0.8;
        }
        self
    }

    /// Whether the normalized verdict lets a candidate through.
    pub fn accepts(&self) -> bool {
        matches!(self.verdict, VerdictKind::Accept | VerdictKind::AcceptWithCaution)
    }
}

/// Judges whether a candidate rule is supported by the cited evidence.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, rule: &str, evidence: &str) -> Result<Verdict, LlmError>;
}

/// Distills a sanitized session transcript into a diary document.
#[async_trait]
pub trait DiaryExtractor: Send + Sync {
    async fn extract(&self, text: &str, meta: &SessionMeta) -> Result<DiaryEntry, LlmError>;
}

// ── Fakes for tests and offline runs ────────────────────────────────────────

/// Scripted validator: pops queued verdicts, then falls back to accept.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeValidator {
    queue: parking_lot::Mutex<std::collections::VecDeque<Result<Verdict, LlmError>>>,
    calls: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_verdict(&self, verdict: Verdict) {
        self.queue.lock().push_back(Ok(verdict));
    }

    pub fn push_error(&self, error: LlmError) {
        self.queue.lock().push_back(Err(error));
    }

    pub fn accept() -> Verdict {
        Verdict {
            valid: true,
            verdict: VerdictKind::Accept,
            confidence: 0.9,
            evidence: Vec::new(),
            suggested_refinement: None,
        }
    }

    pub fn reject() -> Verdict {
        Verdict {
            valid: false,
            verdict: VerdictKind::Reject,
            confidence: 0.9,
            evidence: Vec::new(),
            suggested_refinement: None,
        }
    }

    /// Rules this validator was asked about.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Validator for FakeValidator {
    async fn validate(&self, rule: &str, _evidence: &str) -> Result<Verdict, LlmError> {
        self.calls.lock().push(rule.to_string());
        self.queue.lock().pop_front().unwrap_or_else(|| Ok(Self::accept()))
    }
}

/// Deterministic extractor: one key learning per `LEARNED:` line in the
/// transcript, one challenge per `PROBLEM:` line.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeExtractor;

#[cfg(any(test, feature = "test-support"))]
impl FakeExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl DiaryExtractor for FakeExtractor {
    async fn extract(&self, text: &str, meta: &SessionMeta) -> Result<DiaryEntry, LlmError> {
        let mut entry = DiaryEntry::default();
        for line in text.lines() {
            if let Some(learning) = line.trim().strip_prefix("LEARNED:") {
                entry.key_learnings.push(learning.trim().to_string());
            } else if let Some(problem) = line.trim().strip_prefix("PROBLEM:") {
                entry.challenges.push(problem.trim().to_string());
            } else if let Some(decision) = line.trim().strip_prefix("DECIDED:") {
                entry.decisions.push(decision.trim().to_string());
            }
        }
        if let Some(agent) = meta.agent.as_deref() {
            entry.tags.push(agent.to_string());
        }
        Ok(entry)
    }
}

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;
