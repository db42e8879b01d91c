// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome records: the observed result of using one or more rules, and the
//! weighting that turns those observations into feedback.

use crate::bullet::FeedbackType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sessions faster than this (and not failed) earn a helpful bonus.
pub const FAST_THRESHOLD_SECS: u64 = 600;
/// Sessions slower than this earn a harmful penalty.
pub const SLOW_THRESHOLD_SECS: u64 = 3600;

/// Overall result of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failure,
    Mixed,
}

crate::simple_display! {
    OutcomeStatus {
        Success => "success",
        Failure => "failure",
        Mixed => "mixed",
    }
}

impl OutcomeStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Some(Self::Success),
            "failure" => Some(Self::Failure),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// Reported mood of the user across the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// One observed outcome, appended to `outcomes.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRecord {
    pub session_id: String,
    pub outcome: OutcomeStatus,
    #[serde(default)]
    pub rules_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_count: Option<u32>,
    #[serde(default)]
    pub had_retries: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    pub recorded_at: DateTime<Utc>,
    /// Session transcript path, used for provenance on feedback events.
    #[serde(default)]
    pub path: String,
}

/// The feedback a single outcome translates to, applied once per cited rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackSignal {
    pub feedback_type: FeedbackType,
    /// Aggregated signal weight, clamped to [0.1, 2.0].
    pub weight: f64,
}

impl OutcomeRecord {
    /// Weigh the outcome's signals and pick the dominant feedback direction.
    /// Ties break to helpful.
    pub fn feedback_signal(&self) -> FeedbackSignal {
        let mut helpful = 0.0f64;
        let mut harmful = 0.0f64;

        match self.outcome {
            OutcomeStatus::Success => helpful += 1.0,
            OutcomeStatus::Failure => harmful += 1.0,
            OutcomeStatus::Mixed => {
                helpful += 0.1;
                harmful += 0.1;
            }
        }

        if let Some(secs) = self.duration_sec {
            if secs < FAST_THRESHOLD_SECS && self.outcome != OutcomeStatus::Failure {
                helpful += 0.5;
            } else if secs > SLOW_THRESHOLD_SECS {
                harmful += 0.3;
            }
        }

        match self.error_count {
            Some(n) if n >= 2 => harmful += 0.7,
            Some(1) => harmful += 0.3,
            _ => {}
        }

        if self.had_retries {
            harmful += 0.5;
        }

        match self.sentiment {
            Some(Sentiment::Positive) => helpful += 0.3,
            Some(Sentiment::Negative) => harmful += 0.5,
            Some(Sentiment::Neutral) | None => {}
        }

        let (feedback_type, weight) = if harmful > helpful {
            (FeedbackType::Harmful, harmful)
        } else {
            (FeedbackType::Helpful, helpful)
        };
        FeedbackSignal { feedback_type, weight: weight.clamp(0.1, 2.0) }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
