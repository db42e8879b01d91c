// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cm-core: Core library for the cass-memory (cm) CLI tool

pub mod macros;

pub mod bullet;
pub mod clock;
pub mod config;
pub mod delta;
pub mod diary;
pub mod id;
pub mod outcome;
pub mod playbook;
pub mod sanitize;
pub mod scoring;
pub mod similarity;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bullet::{
    derive_source_agent, Bullet, BulletId, BulletKind, BulletState, BulletType, FeedbackEvent,
    FeedbackType, Maturity, NewBullet, Scope,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Config, ContextConfig, SanitizeConfig, ScoringConfig};
pub use delta::PlaybookDelta;
pub use diary::{DiaryEntry, DiaryStatus, SessionMeta};
pub use id::short;
pub use outcome::{FeedbackSignal, OutcomeRecord, OutcomeStatus, Sentiment};
pub use playbook::{DeprecatedPattern, Playbook, PlaybookMeta};
pub use sanitize::Sanitizer;
pub use similarity::{extract_keywords, find_similar_bullet, hash_content, jaccard};
