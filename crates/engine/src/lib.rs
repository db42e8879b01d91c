// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cm-engine: the evolution engine over the playbook store.
//!
//! Pure pieces (curator post-processing, gate classification, outcome
//! weighting) live in cm-core or as synchronous functions here; everything
//! that touches disk goes through cm-storage's locks, and everything that
//! talks to an external tool goes through a cm-adapters trait.

pub mod curator;
pub mod feedback;
pub mod gate;
pub mod outcome;
pub mod ranker;
pub mod reflect;

pub use curator::{curate, Conflict, CurationOutcome, InversionRecord, PromotionRecord};
pub use feedback::{record_feedback, FeedbackOptions};
pub use gate::{evaluate_gate, GateDecision};
pub use outcome::{apply_outcome, AppliedOutcome, OutcomeError};
pub use ranker::{build_context, ContextOptions, ContextResult, RankedBullet};
pub use reflect::{ReflectError, ReflectOptions, ReflectionSummary, Reflector, SessionOutcome};
