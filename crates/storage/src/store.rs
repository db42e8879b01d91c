// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Playbook load/save with cascading scopes and the toxic filter.
//!
//! Load never loses user data: a file that fails to parse is quarantined to
//! `<path>.backup.<epoch>` and the caller sees an empty playbook plus a
//! warning. Saves go through the atomic writer under the file lock.

use crate::atomic::atomic_write;
use crate::lock::{FileLock, LockError};
use crate::paths::{repo_playbook_path, repo_toxic_path, DataRoot};
use crate::toxic::{self, ToxicEntry};
use chrono::{DateTime, Utc};
use cm_core::{Config, Playbook};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize playbook: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// File-backed access to the global playbook and an optional repo overlay.
#[derive(Debug, Clone)]
pub struct PlaybookStore {
    global_path: PathBuf,
    repo_root: Option<PathBuf>,
    toxic_paths: Vec<PathBuf>,
}

impl PlaybookStore {
    /// Store over the standard layout for this data root and config.
    pub fn open(data_root: &DataRoot, config: &Config, repo_root: Option<&Path>) -> Self {
        let mut toxic_paths = vec![data_root.toxic_log_path()];
        if let Some(repo) = repo_root {
            toxic_paths.push(repo_toxic_path(repo));
        }
        Self {
            global_path: data_root.playbook_path(config),
            repo_root: repo_root.map(Path::to_path_buf),
            toxic_paths,
        }
    }

    /// Store over explicit paths (tests, unusual layouts).
    pub fn at(global_path: impl Into<PathBuf>) -> Self {
        Self { global_path: global_path.into(), repo_root: None, toxic_paths: Vec::new() }
    }

    pub fn with_repo(mut self, repo_root: impl Into<PathBuf>) -> Self {
        let repo = repo_root.into();
        self.toxic_paths.push(repo_toxic_path(&repo));
        self.repo_root = Some(repo);
        self
    }

    pub fn with_toxic_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.toxic_paths.insert(0, path.into());
        self
    }

    pub fn global_path(&self) -> &Path {
        &self.global_path
    }

    /// Repo overlay playbook path, when a repo root is configured.
    pub fn repo_path(&self) -> Option<PathBuf> {
        self.repo_root.as_deref().map(repo_playbook_path)
    }

    /// Load one playbook file with quarantine-on-corruption semantics.
    pub fn load_file(&self, path: &Path) -> Result<Playbook, StoreError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Playbook::default())
            }
            Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
        };
        if text.trim().is_empty() {
            return Ok(Playbook::default());
        }
        match serde_yaml::from_str::<Playbook>(&text) {
            Ok(mut playbook) => {
                // Events are authoritative; repair cached counters on load.
                playbook.rebuild_counters();
                Ok(playbook)
            }
            Err(e) => {
                let backup = quarantine_path(path);
                warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "playbook failed to parse; quarantining"
                );
                std::fs::rename(path, &backup)
                    .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
                Ok(Playbook::default())
            }
        }
    }

    /// Load the global playbook only.
    pub fn load_global(&self) -> Result<Playbook, StoreError> {
        self.load_file(&self.global_path)
    }

    /// Load the cascaded view: global, overlaid by the repo playbook when one
    /// exists, with toxic content filtered out.
    pub fn load_merged(&self) -> Result<Playbook, StoreError> {
        let global = self.load_file(&self.global_path)?;
        let mut merged = match self.repo_path() {
            Some(repo_path) if repo_path.exists() => {
                let overlay = self.load_file(&repo_path)?;
                Playbook::merge_cascade(global, overlay)
            }
            _ => global,
        };
        let entries = self.toxic_entries();
        if !entries.is_empty() {
            let before = merged.bullets.len();
            merged.bullets.retain(|b| !toxic::is_toxic(&b.content, &entries));
            let dropped = before - merged.bullets.len();
            if dropped > 0 {
                info!(dropped, "suppressed toxic bullets from merged view");
            }
        }
        Ok(merged)
    }

    /// All toxic entries along the cascade (global first, then repo).
    pub fn toxic_entries(&self) -> Vec<ToxicEntry> {
        let mut entries = Vec::new();
        for path in &self.toxic_paths {
            entries.extend(toxic::load_toxic(path));
        }
        entries
    }

    /// Persist a playbook to `path` atomically, stamping `last_reflection`.
    /// The caller is expected to hold the file lock (see [`Self::mutate`]).
    pub fn save_to(&self, path: &Path, playbook: &mut Playbook, now: DateTime<Utc>) -> Result<(), StoreError> {
        playbook.metadata.last_reflection = Some(now);
        if playbook.metadata.created_at == DateTime::<Utc>::UNIX_EPOCH {
            playbook.metadata.created_at = now;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        }
        let yaml = serde_yaml::to_string(playbook)?;
        atomic_write(path, yaml.as_bytes())
            .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        Ok(())
    }

    /// Load-mutate-save one playbook file under its advisory lock. This is
    /// the single write path shared by every mutating command.
    pub fn mutate<T>(
        &self,
        path: &Path,
        now: DateTime<Utc>,
        op: impl FnOnce(&mut Playbook) -> T,
    ) -> Result<T, StoreError> {
        let _guard = FileLock::acquire(path)?;
        let mut playbook = self.load_file(path)?;
        let out = op(&mut playbook);
        self.save_to(path, &mut playbook, now)?;
        Ok(out)
    }

    /// Mutate the global playbook under its lock.
    pub fn mutate_global<T>(
        &self,
        now: DateTime<Utc>,
        op: impl FnOnce(&mut Playbook) -> T,
    ) -> Result<T, StoreError> {
        let path = self.global_path.clone();
        self.mutate(&path, now, op)
    }

    /// The file that owns `id`: repo overlay first, then global, defaulting
    /// to global for ids that exist nowhere yet.
    pub fn owner_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        if let Some(repo_path) = self.repo_path() {
            if repo_path.exists() && self.load_file(&repo_path)?.contains(id) {
                return Ok(repo_path);
            }
        }
        Ok(self.global_path.clone())
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let epoch = Utc::now().timestamp();
    let mut os = path.as_os_str().to_os_string();
    os.push(format!(".backup.{}", epoch));
    PathBuf::from(os)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
