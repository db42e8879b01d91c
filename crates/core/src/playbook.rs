// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Playbook: the aggregate root, a versioned collection of bullets.

use crate::bullet::{Bullet, BulletId, FeedbackEvent, Maturity, NewBullet, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 2;

/// Playbook-level bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookMeta {
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reflection: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_reflections: u32,
    #[serde(default)]
    pub total_sessions_processed: u32,
}

impl Default for PlaybookMeta {
    fn default() -> Self {
        Self {
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            last_reflection: None,
            total_reflections: 0,
            total_sessions_processed: 0,
        }
    }
}

/// A known-bad practice matched case-insensitively against task text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprecatedPattern {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl DeprecatedPattern {
    /// Case-insensitive substring match against candidate text.
    pub fn matches(&self, text: &str) -> bool {
        !self.pattern.is_empty()
            && text.to_lowercase().contains(&self.pattern.to_lowercase())
    }
}

/// A versioned collection of bullets plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playbook {
    pub schema_version: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: PlaybookMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deprecated_patterns: Vec<DeprecatedPattern>,
    #[serde(default)]
    pub bullets: Vec<Bullet>,
}

impl Default for Playbook {
    fn default() -> Self {
        Self::named("playbook")
    }
}

impl Playbook {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.into(),
            description: String::new(),
            metadata: PlaybookMeta::default(),
            deprecated_patterns: Vec::new(),
            bullets: Vec::new(),
        }
    }

    pub fn find_bullet(&self, id: &str) -> Option<&Bullet> {
        self.bullets.iter().find(|b| b.id == *id)
    }

    pub fn find_bullet_mut(&mut self, id: &str) -> Option<&mut Bullet> {
        self.bullets.iter_mut().find(|b| b.id == *id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_bullet(id).is_some()
    }

    /// Bullets with no retirement marker set, in insertion order.
    pub fn active_bullets(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets.iter().filter(|b| b.is_active())
    }

    /// Case-insensitive category query over active bullets.
    pub fn bullets_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a Bullet> + 'a {
        self.active_bullets().filter(move |b| b.category.eq_ignore_ascii_case(category))
    }

    /// Active bullets visible in the given scope. `Workspace`-scoped bullets
    /// require a matching workspace; bullets of other scopes pass through.
    pub fn bullets_for_workspace<'a>(
        &'a self,
        workspace: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Bullet> + 'a {
        self.active_bullets().filter(move |b| match (b.scope, workspace) {
            (Scope::Workspace, Some(ws)) => b.workspace.as_deref() == Some(ws),
            (Scope::Workspace, None) => false,
            _ => true,
        })
    }

    pub fn filter_by_scope<'a>(&'a self, scope: Scope) -> impl Iterator<Item = &'a Bullet> + 'a {
        self.active_bullets().filter(move |b| b.scope == scope)
    }

    /// Construct and insert a new bullet; returns its id.
    pub fn add_bullet(
        &mut self,
        data: NewBullet,
        source_session: Option<&str>,
        half_life_days: Option<f64>,
        now: DateTime<Utc>,
    ) -> BulletId {
        let bullet = Bullet::create(data, source_session, half_life_days, now);
        let id = bullet.id.clone();
        self.bullets.push(bullet);
        id
    }

    /// Set all retirement markers on a bullet. Returns false on unknown id.
    pub fn deprecate_bullet(
        &mut self,
        id: &str,
        reason: &str,
        replaced_by: Option<BulletId>,
        now: DateTime<Utc>,
    ) -> bool {
        match self.find_bullet_mut(id) {
            Some(b) => {
                b.retire(reason, replaced_by, now);
                true
            }
            None => false,
        }
    }

    pub fn pin_bullet(&mut self, id: &str, reason: Option<String>, now: DateTime<Utc>) -> bool {
        match self.find_bullet_mut(id) {
            Some(b) => {
                b.pinned = true;
                b.pinned_reason = reason;
                b.updated_at = now;
                true
            }
            None => false,
        }
    }

    pub fn unpin_bullet(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.find_bullet_mut(id) {
            Some(b) => {
                b.pinned = false;
                b.pinned_reason = None;
                b.updated_at = now;
                true
            }
            None => false,
        }
    }

    /// Append a feedback event to a bullet. Returns false on unknown id.
    pub fn record_feedback(&mut self, id: &str, event: FeedbackEvent) -> bool {
        match self.find_bullet_mut(id) {
            Some(b) => {
                b.record_feedback(event);
                true
            }
            None => false,
        }
    }

    /// Regenerate every bullet's cached counters from its event list.
    pub fn rebuild_counters(&mut self) {
        for b in &mut self.bullets {
            if !b.counters_consistent() {
                b.rebuild_counters();
            }
        }
    }

    /// Merge a repo-level overlay into a global playbook: overlay bullets
    /// override global bullets by id, `deprecated_patterns` concatenate
    /// (global first), and the merged view keeps the global metadata.
    pub fn merge_cascade(global: Playbook, overlay: Playbook) -> Playbook {
        let mut merged = global;
        for bullet in overlay.bullets {
            match merged.bullets.iter().position(|b| b.id == bullet.id) {
                Some(i) => merged.bullets[i] = bullet,
                None => merged.bullets.push(bullet),
            }
        }
        merged.deprecated_patterns.extend(overlay.deprecated_patterns);
        merged
    }

    /// Count of active bullets per maturity tier, for status displays.
    pub fn maturity_counts(&self) -> [(Maturity, usize); 3] {
        let count = |m: Maturity| self.active_bullets().filter(|b| b.maturity == m).count();
        [
            (Maturity::Candidate, count(Maturity::Candidate)),
            (Maturity::Established, count(Maturity::Established)),
            (Maturity::Proven, count(Maturity::Proven)),
        ]
    }
}

#[cfg(test)]
#[path = "playbook_tests.rs"]
mod tests;
