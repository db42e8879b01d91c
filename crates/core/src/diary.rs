// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diary documents: what the external extractor distills out of one session.

use serde::{Deserialize, Serialize};

/// How far the extractor got with a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiaryStatus {
    #[default]
    Ok,
    Partial,
    Empty,
}

crate::simple_display! {
    DiaryStatus {
        Ok => "ok",
        Partial => "partial",
        Empty => "empty",
    }
}

/// Metadata handed to the extractor alongside the sanitized transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub session_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

/// Structured distillation of one session transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    #[serde(default)]
    pub status: DiaryStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accomplishments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub challenges: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferences: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_learnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_anchors: Vec<String>,
}

impl DiaryEntry {
    /// A diary with nothing actionable produces no deltas.
    pub fn is_empty(&self) -> bool {
        self.key_learnings.is_empty()
            && self.decisions.is_empty()
            && self.challenges.is_empty()
            && self.preferences.is_empty()
    }
}
