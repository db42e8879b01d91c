// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations. Each command is a thin wrapper over the engine
//! and storage crates; all policy lives there.

pub mod bullet;
pub mod context;
pub mod doctor;
pub mod outcome;
pub mod reflect;

use std::path::PathBuf;

use cm_core::Config;
use cm_storage::{DataRoot, PlaybookStore};

use crate::output::OutputFormat;

/// Resolved environment shared by every command.
pub struct Ctx {
    pub data_root: DataRoot,
    pub config: Config,
    pub store: PlaybookStore,
    pub repo: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Ctx {
    pub fn resolve(repo: Option<PathBuf>, format: OutputFormat) -> Self {
        let data_root = DataRoot::resolve();
        let config = data_root.load_config();
        let store = PlaybookStore::open(&data_root, &config, repo.as_deref());
        Self { data_root, config, store, repo, format }
    }

    /// The workspace string used for scope filtering, when a repo is set.
    pub fn workspace(&self) -> Option<String> {
        self.repo.as_ref().map(|p| p.to_string_lossy().into_owned())
    }
}
