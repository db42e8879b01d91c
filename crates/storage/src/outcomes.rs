// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome log: append-only NDJSON of observed session results.

use cm_core::OutcomeRecord;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Append one record as a single short write, so interleaved processes stay
/// line-atomic without taking the file lock.
pub fn append_outcome(path: &Path, record: &OutcomeRecord) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut line = serde_json::to_string(record)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    line.push('\n');
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

/// Load every parseable record; malformed lines are skipped.
pub fn load_outcomes(path: &Path) -> Vec<OutcomeRecord> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Vec::new(),
    };
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<OutcomeRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(path = %path.display(), line = i + 1, error = %e, "skipping bad outcome line")
            }
        }
    }
    records
}

#[cfg(test)]
#[path = "outcomes_tests.rs"]
mod tests;
