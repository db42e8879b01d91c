// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Toxic log: content that was explicitly forgotten and must never be
//! resurrected by reflection.
//!
//! Append-only NDJSON, one entry per line. Loading tolerates malformed
//! lines; appends are single short writes so interleaved processes stay
//! line-atomic.

use chrono::{DateTime, Utc};
use cm_core::similarity::{hash_content, jaccard};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Jaccard similarity above which a bullet counts as a match for a toxic
/// entry even when the hashes differ.
const TOXIC_SIMILARITY: f64 = 0.85;

/// One forgotten piece of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToxicEntry {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub forgotten_at: DateTime<Utc>,
}

/// Append one entry as a single NDJSON line.
pub fn append_toxic(path: &Path, entry: &ToxicEntry) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut line = serde_json::to_string(entry)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    line.push('\n');
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

/// Load every parseable entry; malformed lines are skipped.
pub fn load_toxic(path: &Path) -> Vec<ToxicEntry> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Vec::new(),
    };
    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ToxicEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                debug!(path = %path.display(), line = i + 1, error = %e, "skipping bad toxic line")
            }
        }
    }
    entries
}

/// A toxic entry suppresses content on an exact normalized-hash match or a
/// Jaccard similarity above the threshold.
pub fn is_toxic(content: &str, entries: &[ToxicEntry]) -> bool {
    if entries.is_empty() {
        return false;
    }
    let hash = hash_content(content);
    entries.iter().any(|entry| {
        hash == hash_content(&entry.content) || jaccard(content, &entry.content) > TOXIC_SIMILARITY
    })
}

#[cfg(test)]
#[path = "toxic_tests.rs"]
mod tests;
