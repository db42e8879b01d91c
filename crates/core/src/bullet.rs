// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bullet: the unit of procedural knowledge stored in a playbook.
//!
//! Field names serialize in camelCase to stay compatible with the historical
//! playbook file format; feedback events are the source of truth and the
//! `helpful_count`/`harmful_count` pair is a denormalized cache over them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a bullet.
    pub struct BulletId("blt-");
}

/// Coarse grouping of what a bullet teaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletKind {
    #[default]
    WorkflowRule,
    AntiPattern,
    StackPattern,
    ToolConfig,
    Preference,
}

crate::simple_display! {
    BulletKind {
        WorkflowRule => "workflow_rule",
        AntiPattern => "anti_pattern",
        StackPattern => "stack_pattern",
        ToolConfig => "tool_config",
        Preference => "preference",
    }
}

/// Whether the bullet prescribes or proscribes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BulletType {
    #[default]
    Rule,
    AntiPattern,
}

crate::simple_display! {
    BulletType {
        Rule => "rule",
        AntiPattern => "anti-pattern",
    }
}

/// Where a bullet applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Global,
    Workspace,
    Language,
    Framework,
    Task,
}

crate::simple_display! {
    Scope {
        Global => "global",
        Workspace => "workspace",
        Language => "language",
        Framework => "framework",
        Task => "task",
    }
}

impl Scope {
    /// Parse a user-supplied scope string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Some(Scope::Global),
            "workspace" => Some(Scope::Workspace),
            "language" => Some(Scope::Language),
            "framework" => Some(Scope::Framework),
            "task" => Some(Scope::Task),
            _ => None,
        }
    }
}

/// Lifecycle state of a bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulletState {
    #[default]
    Draft,
    Active,
    Retired,
}

crate::simple_display! {
    BulletState {
        Draft => "draft",
        Active => "active",
        Retired => "retired",
    }
}

/// Quality tier of a bullet: candidate → established → proven, with
/// `deprecated` as the terminal tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maturity {
    #[default]
    Candidate,
    Established,
    Proven,
    Deprecated,
}

crate::simple_display! {
    Maturity {
        Candidate => "candidate",
        Established => "established",
        Proven => "proven",
        Deprecated => "deprecated",
    }
}

impl Maturity {
    /// Promotion ladder position. `Deprecated` is not on the ladder.
    pub fn rank(self) -> Option<u8> {
        match self {
            Maturity::Candidate => Some(0),
            Maturity::Established => Some(1),
            Maturity::Proven => Some(2),
            Maturity::Deprecated => None,
        }
    }
}

/// Direction of a feedback event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Helpful,
    Harmful,
}

crate::simple_display! {
    FeedbackType {
        Helpful => "helpful",
        Harmful => "harmful",
    }
}

/// One observed signal about a bullet. Events are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEvent {
    #[serde(rename = "type")]
    pub event_type: FeedbackType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl FeedbackEvent {
    pub fn new(event_type: FeedbackType, timestamp: DateTime<Utc>) -> Self {
        Self { event_type, timestamp, session_path: None, reason: None, context: None }
    }
}

/// A single rule of procedural knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    pub id: BulletId,
    pub content: String,
    /// Case-insensitive grouping key.
    pub category: String,
    #[serde(default)]
    pub kind: BulletKind,
    #[serde(rename = "type", default)]
    pub bullet_type: BulletType,
    #[serde(default)]
    pub is_negative: bool,

    #[serde(default)]
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,

    #[serde(default)]
    pub state: BulletState,
    #[serde(default)]
    pub maturity: Maturity,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_reason: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<BulletId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_sessions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feedback_events: Vec<FeedbackEvent>,
    /// Cache of helpful events; regenerated from `feedback_events` on load.
    #[serde(default)]
    pub helpful_count: u32,
    /// Cache of harmful events; regenerated from `feedback_events` on load.
    #[serde(default)]
    pub harmful_count: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_validated_at: Option<DateTime<Utc>>,

    /// Per-bullet decay override; config default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_decay_half_life_days: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// Caller-supplied fields for a bullet about to be created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBullet {
    pub content: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<BulletKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    /// Initial lifecycle state; `draft` unless the evidence gate auto-accepts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<BulletState>,
}

impl Bullet {
    /// Construct a fresh bullet with creation defaults: `draft` state,
    /// `candidate` maturity, zero feedback, `created_at == updated_at`.
    pub fn create(
        data: NewBullet,
        source_session: Option<&str>,
        half_life_days: Option<f64>,
        now: DateTime<Utc>,
    ) -> Self {
        let kind = data.kind.unwrap_or_default();
        let is_negative = kind == BulletKind::AntiPattern;
        let content_hash = crate::similarity::hash_content(&data.content);
        Self {
            id: BulletId::new(),
            content: data.content,
            category: data.category,
            kind,
            bullet_type: if is_negative { BulletType::AntiPattern } else { BulletType::Rule },
            is_negative,
            scope: data.scope.unwrap_or_default(),
            scope_key: data.scope_key,
            workspace: data.workspace,
            state: data.state.unwrap_or(BulletState::Draft),
            maturity: Maturity::Candidate,
            pinned: false,
            pinned_reason: None,
            deprecated: false,
            deprecated_at: None,
            deprecation_reason: None,
            replaced_by: None,
            source_sessions: source_session.map(|s| vec![s.to_string()]).unwrap_or_default(),
            source_agents: source_session
                .map(|s| vec![derive_source_agent(s).to_string()])
                .unwrap_or_default(),
            tags: data.tags,
            feedback_events: Vec::new(),
            helpful_count: 0,
            harmful_count: 0,
            created_at: now,
            updated_at: now,
            last_validated_at: None,
            confidence_decay_half_life_days: half_life_days,
            embedding: None,
            content_hash: Some(content_hash),
        }
    }

    /// A bullet is active unless any retirement marker is set.
    pub fn is_active(&self) -> bool {
        !self.deprecated
            && self.state != BulletState::Retired
            && self.maturity != Maturity::Deprecated
    }

    /// Set all three retirement markers in one step so they stay in agreement.
    pub fn retire(
        &mut self,
        reason: impl Into<String>,
        replaced_by: Option<BulletId>,
        now: DateTime<Utc>,
    ) {
        self.deprecated = true;
        self.deprecated_at = Some(now);
        self.deprecation_reason = Some(reason.into());
        self.state = BulletState::Retired;
        self.maturity = Maturity::Deprecated;
        self.replaced_by = replaced_by;
        self.updated_at = now;
    }

    /// Append a feedback event and keep the denormalized counters and
    /// timestamps consistent. Helpful feedback counts as validation.
    pub fn record_feedback(&mut self, event: FeedbackEvent) {
        match event.event_type {
            FeedbackType::Helpful => {
                self.helpful_count += 1;
                self.last_validated_at = Some(event.timestamp);
            }
            FeedbackType::Harmful => self.harmful_count += 1,
        }
        self.updated_at = event.timestamp;
        self.feedback_events.push(event);
    }

    /// Regenerate the counters from the events (invariant repair after load).
    pub fn rebuild_counters(&mut self) {
        self.helpful_count = self
            .feedback_events
            .iter()
            .filter(|e| e.event_type == FeedbackType::Helpful)
            .count() as u32;
        self.harmful_count = self.feedback_events.len() as u32 - self.helpful_count;
    }

    /// Whether the cached counters agree with the event list.
    pub fn counters_consistent(&self) -> bool {
        let helpful = self
            .feedback_events
            .iter()
            .filter(|e| e.event_type == FeedbackType::Helpful)
            .count() as u32;
        self.helpful_count == helpful
            && self.harmful_count == self.feedback_events.len() as u32 - helpful
    }

    /// Timestamp of the most recent feedback event, if any.
    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.feedback_events.iter().map(|e| e.timestamp).max()
    }

    /// Whether this bullet advises avoidance.
    pub fn is_anti_pattern(&self) -> bool {
        self.is_negative || self.kind == BulletKind::AntiPattern
    }
}

/// Derive the authoring agent from a session path by known path markers.
pub fn derive_source_agent(session_path: &str) -> &'static str {
    let lower = session_path.to_ascii_lowercase();
    if lower.contains(".claude") || lower.contains("claude-code") {
        "claude-code"
    } else if lower.contains(".cursor") {
        "cursor"
    } else if lower.contains(".codex") {
        "codex"
    } else if lower.contains(".aider") {
        "aider"
    } else {
        "unknown"
    }
}

#[cfg(test)]
#[path = "bullet_tests.rs"]
mod tests;
