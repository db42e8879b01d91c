// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration surface, parsed from `config.toml` in the data root.
//!
//! Every field has a serde default so a missing or partial file behaves like
//! the documented defaults. Unknown keys are ignored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Scoring and lifecycle thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    pub decay_half_life_days: f64,
    pub harmful_multiplier: f64,
    pub min_feedback_for_active: f64,
    pub min_helpful_for_proven: f64,
    pub max_harmful_ratio_for_proven: f64,
    pub prune_harmful_threshold: f64,
    pub stale_days: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            decay_half_life_days: 90.0,
            harmful_multiplier: 4.0,
            min_feedback_for_active: 3.0,
            min_helpful_for_proven: 5.0,
            max_harmful_ratio_for_proven: 0.1,
            prune_harmful_threshold: 2.0,
            stale_days: 90,
        }
    }
}

/// Context-ranking limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextConfig {
    pub max_bullets_in_context: usize,
    pub max_history_in_context: usize,
    pub session_lookback_days: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { max_bullets_in_context: 10, max_history_in_context: 5, session_lookback_days: 30 }
    }
}

/// Secret-redaction options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SanitizeConfig {
    pub enabled: bool,
    pub extra_patterns: Vec<String>,
    pub audit_log: bool,
    /// "info" or "debug"
    pub audit_level: String,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extra_patterns: Vec::new(),
            audit_log: false,
            audit_level: "debug".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Override for the global playbook location.
    pub playbook_path: Option<PathBuf>,
    /// Name or path of the external session-search tool.
    pub cass_path: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,

    pub scoring: ScoringConfig,
    pub context: ContextConfig,
    pub sanitization: SanitizeConfig,

    pub dedup_similarity_threshold: Option<f64>,
    pub validation_enabled: Option<bool>,
    pub validation_lookback_days: Option<u32>,
    pub semantic_search_enabled: Option<bool>,
    /// Embedding model name, or "none".
    pub embedding_model: Option<String>,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn cass_path(&self) -> &str {
        self.cass_path.as_deref().unwrap_or("cass")
    }

    pub fn dedup_similarity_threshold(&self) -> f64 {
        self.dedup_similarity_threshold.unwrap_or(0.85)
    }

    pub fn validation_enabled(&self) -> bool {
        self.validation_enabled.unwrap_or(true)
    }

    pub fn validation_lookback_days(&self) -> u32 {
        self.validation_lookback_days.unwrap_or(30)
    }

    pub fn semantic_search_enabled(&self) -> bool {
        self.semantic_search_enabled.unwrap_or(false)
    }

    pub fn embedding_model(&self) -> &str {
        self.embedding_model.as_deref().unwrap_or("none")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
