// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cm-storage: file-backed persistence for playbooks and their logs.
//!
//! Every mutating path goes through the advisory [`lock`] and the
//! [`atomic`] writer; append-only logs tolerate interleaved writers.

pub mod atomic;
pub mod diary;
pub mod embeddings;
pub mod lock;
pub mod outcomes;
pub mod paths;
pub mod processed;
pub mod store;
pub mod toxic;

pub use atomic::atomic_write;
pub use diary::{diary_file_name, load_diary, save_diary};
pub use embeddings::EmbeddingCache;
pub use lock::{with_lock, FileLock, LockError, LockOptions};
pub use outcomes::{append_outcome, load_outcomes};
pub use paths::DataRoot;
pub use processed::{ProcessedEntry, ProcessedLog};
pub use store::{PlaybookStore, StoreError};
pub use toxic::{append_toxic, is_toxic, load_toxic, ToxicEntry};
