// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout under the per-user data root.
//!
//! ```text
//! <root>/playbook.yaml                     main global playbook
//! <root>/config.toml                       configuration
//! <root>/diary/<hash>.json                 one document per processed session
//! <root>/reflections/<scope>.processed.log tab-separated processed log
//! <root>/outcomes.jsonl                    append-only outcome log
//! <root>/toxic_bullets.log                 append-only toxic log
//! <root>/embeddings/bullets.json           optional embedding cache
//! <repo>/.cass/playbook.yaml               per-repo overlay
//! <repo>/.cass/toxic.log                   per-repo toxic log
//! ```

use cm_core::Config;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment override for the data root.
pub const DATA_DIR_ENV: &str = "CM_DATA_DIR";
/// Environment override for the external search tool.
pub const CASS_PATH_ENV: &str = "CM_CASS_PATH";

/// Resolved data root plus derived paths.
#[derive(Debug, Clone)]
pub struct DataRoot {
    root: PathBuf,
}

impl DataRoot {
    /// Resolve from `CM_DATA_DIR`, falling back to the platform data dir.
    pub fn resolve() -> Self {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return Self { root: PathBuf::from(dir) };
        }
        let root = dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("cass-memory");
        Self { root }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load `config.toml` if present; otherwise defaults. A malformed file
    /// degrades to defaults with a warning rather than blocking every
    /// command.
    pub fn load_config(&self) -> Config {
        let path = self.config_path();
        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => match Config::from_toml_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed config");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        };
        if let Ok(cass) = std::env::var(CASS_PATH_ENV) {
            if !cass.is_empty() {
                config.cass_path = Some(cass);
            }
        }
        config
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Global playbook path, honoring the config override.
    pub fn playbook_path(&self, config: &Config) -> PathBuf {
        config.playbook_path.clone().unwrap_or_else(|| self.root.join("playbook.yaml"))
    }

    pub fn diary_dir(&self) -> PathBuf {
        self.root.join("diary")
    }

    pub fn reflections_dir(&self) -> PathBuf {
        self.root.join("reflections")
    }

    /// Processed log for the global scope or one workspace.
    pub fn processed_log_path(&self, workspace: Option<&Path>) -> PathBuf {
        let scope = match workspace {
            Some(ws) => workspace_key(ws),
            None => "global".to_string(),
        };
        self.reflections_dir().join(format!("{}.processed.log", scope))
    }

    pub fn outcomes_path(&self) -> PathBuf {
        self.root.join("outcomes.jsonl")
    }

    pub fn toxic_log_path(&self) -> PathBuf {
        self.root.join("toxic_bullets.log")
    }

    pub fn embeddings_path(&self) -> PathBuf {
        self.root.join("embeddings").join("bullets.json")
    }
}

/// Per-repo overlay playbook: `<repo>/.cass/playbook.yaml`.
pub fn repo_playbook_path(repo: &Path) -> PathBuf {
    repo.join(".cass").join("playbook.yaml")
}

/// Per-repo toxic log: `<repo>/.cass/toxic.log`.
pub fn repo_toxic_path(repo: &Path) -> PathBuf {
    repo.join(".cass").join("toxic.log")
}

/// Stable short scope key for a workspace path: `ws-` plus the first 8 hex
/// digits of its SHA-256.
pub fn workspace_key(workspace: &Path) -> String {
    let digest = Sha256::digest(workspace.to_string_lossy().as_bytes());
    let hex = format!("{:x}", digest);
    format!("ws-{}", &hex[..8])
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
