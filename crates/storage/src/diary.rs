// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted diary documents, one pretty-printed JSON file per processed
//! session under `diary/`.

use cm_core::similarity::hash_content;
use cm_core::DiaryEntry;
use std::path::{Path, PathBuf};

use crate::atomic::atomic_write;

/// Stable file name for a session's diary: hash of the session path.
pub fn diary_file_name(session_path: &str) -> String {
    format!("{}.json", hash_content(session_path))
}

pub fn diary_path(dir: &Path, session_path: &str) -> PathBuf {
    dir.join(diary_file_name(session_path))
}

/// Write the diary atomically, creating the directory on first use.
pub fn save_diary(dir: &Path, session_path: &str, entry: &DiaryEntry) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(entry)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    atomic_write(&diary_path(dir, session_path), json.as_bytes())
}

/// Load a previously saved diary, if one exists and parses.
pub fn load_diary(dir: &Path, session_path: &str) -> Option<DiaryEntry> {
    let text = std::fs::read_to_string(diary_path(dir, session_path)).ok()?;
    serde_json::from_str(&text).ok()
}

#[cfg(test)]
#[path = "diary_tests.rs"]
mod tests;
