// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Processed log: which sessions have already been through reflection.
//!
//! Tab-separated with a header row. Loading tolerates malformed rows;
//! membership checks are O(1) against an in-memory set keyed by session
//! path. Saves go through the atomic writer.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::atomic::atomic_write;

const HEADER: &str = "# id\tsessionPath\tprocessedAt\tdeltasProposed\tdeltasApplied";

/// One reflected session.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedEntry {
    pub id: Option<String>,
    pub session_path: String,
    pub processed_at: DateTime<Utc>,
    pub deltas_proposed: u32,
    pub deltas_applied: u32,
}

impl ProcessedEntry {
    fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.id.as_deref().unwrap_or("-"),
            self.session_path,
            self.processed_at.to_rfc3339(),
            self.deltas_proposed,
            self.deltas_applied,
        )
    }

    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split('\t');
        let id = match fields.next()? {
            "-" | "" => None,
            id => Some(id.to_string()),
        };
        let session_path = fields.next()?.to_string();
        let processed_at = DateTime::parse_from_rfc3339(fields.next()?)
            .ok()?
            .with_timezone(&Utc);
        let deltas_proposed = fields.next()?.parse().ok()?;
        let deltas_applied = fields.next()?.parse().ok()?;
        Some(Self { id, session_path, processed_at, deltas_proposed, deltas_applied })
    }
}

/// The per-scope log with its O(1) membership index.
#[derive(Debug)]
pub struct ProcessedLog {
    path: PathBuf,
    entries: Vec<ProcessedEntry>,
    seen: HashSet<String>,
}

impl ProcessedLog {
    /// Load the log at `path`; a missing file is an empty log.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        if let Ok(text) = std::fs::read_to_string(&path) {
            for (i, line) in text.lines().enumerate() {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match ProcessedEntry::parse(line) {
                    Some(entry) => {
                        seen.insert(entry.session_path.clone());
                        entries.push(entry);
                    }
                    None => {
                        debug!(path = %path.display(), line = i + 1, "skipping bad processed row")
                    }
                }
            }
        }
        Self { path, entries, seen }
    }

    pub fn contains(&self, session_path: &str) -> bool {
        self.seen.contains(session_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ProcessedEntry] {
        &self.entries
    }

    /// Record (or overwrite) the entry for a session path.
    pub fn record(&mut self, entry: ProcessedEntry) {
        match self.entries.iter_mut().find(|e| e.session_path == entry.session_path) {
            Some(existing) => *existing = entry,
            None => {
                self.seen.insert(entry.session_path.clone());
                self.entries.push(entry);
            }
        }
    }

    /// Persist atomically with the header row.
    pub fn save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = String::with_capacity(64 * (self.entries.len() + 1));
        out.push_str(HEADER);
        out.push('\n');
        for entry in &self.entries {
            out.push_str(&entry.to_line());
            out.push('\n');
        }
        atomic_write(&self.path, out.as_bytes())
    }
}

#[cfg(test)]
#[path = "processed_tests.rs"]
mod tests;
