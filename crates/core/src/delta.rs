// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proposed playbook changes, produced by reflection and consumed by the
//! curator.
//!
//! Serializes with `{"op": "add", ...fields}` format so delta batches can be
//! inspected and replayed from JSON.

use crate::bullet::NewBullet;
use serde::{Deserialize, Serialize};

/// One proposed change to a playbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlaybookDelta {
    /// Propose a new bullet. Deduplicated against active content first.
    Add {
        bullet: NewBullet,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_session: Option<String>,
    },

    /// The cited bullet helped.
    Helpful {
        bullet_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_session: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },

    /// The cited bullet hurt.
    Harmful {
        bullet_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_session: Option<String>,
    },

    /// Rewrite a bullet's content in place.
    Replace { bullet_id: String, new_content: String },

    /// Retire a bullet.
    Deprecate {
        bullet_id: String,
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replaced_by: Option<String>,
    },

    /// Fold several bullets into one new bullet and retire the sources.
    Merge { bullet_ids: Vec<String>, merged_content: String },
}

impl PlaybookDelta {
    /// Short operation name for conflict reporting and logs.
    pub fn op(&self) -> &'static str {
        match self {
            PlaybookDelta::Add { .. } => "add",
            PlaybookDelta::Helpful { .. } => "helpful",
            PlaybookDelta::Harmful { .. } => "harmful",
            PlaybookDelta::Replace { .. } => "replace",
            PlaybookDelta::Deprecate { .. } => "deprecate",
            PlaybookDelta::Merge { .. } => "merge",
        }
    }
}

#[cfg(test)]
#[path = "delta_tests.rs"]
mod tests;
