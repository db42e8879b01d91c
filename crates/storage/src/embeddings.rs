// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional embedding cache: bullet id → vector, shared read-only after
//! load and rewritten atomically under its own lock.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::atomic::atomic_write;
use crate::lock::{FileLock, LockError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingCache {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingCache {
    /// Load the cache; a missing or unreadable file is an empty cache.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&text) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed embedding cache");
                Self::default()
            }
        }
    }

    pub fn get(&self, bullet_id: &str) -> Option<&[f32]> {
        self.vectors.get(bullet_id).map(Vec::as_slice)
    }

    pub fn insert(&mut self, bullet_id: impl Into<String>, vector: Vec<f32>) {
        self.vectors.insert(bullet_id.into(), vector);
    }

    /// Persist under the cache's own advisory lock.
    pub fn save(&self, path: &Path) -> Result<(), LockError> {
        let _guard = FileLock::acquire(path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| LockError::Io { path: path.to_path_buf(), source })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| LockError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        atomic_write(path, json.as_bytes())
            .map_err(|source| LockError::Io { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
#[path = "embeddings_tests.rs"]
mod tests;
