// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cm-adapters: external collaborators behind trait seams.
//!
//! The engine only ever sees [`HistoryAdapter`], [`Validator`] and
//! [`DiaryExtractor`]; production wires the `cass` subprocess and an LLM
//! provider, tests wire the fakes.

pub mod history;
pub mod llm;
pub mod subprocess;

pub use history::{
    CassHistory, HistoryAdapter, HistoryError, HistoryHit, SearchOpts, TimelineGroup,
    TimelineSession,
};
pub use llm::{DiaryExtractor, LlmError, Validator, Verdict, VerdictKind};

#[cfg(any(test, feature = "test-support"))]
pub use history::FakeHistory;
#[cfg(any(test, feature = "test-support"))]
pub use llm::{FakeExtractor, FakeValidator};
