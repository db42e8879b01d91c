// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reflection orchestrator: one cycle from session discovery to a curated
//! playbook.
//!
//! Each session is processed independently; a failure in one never aborts
//! the batch. The processed-log entry is written *before* curation so a
//! crash mid-cycle cannot reprocess the same session, then updated with the
//! final delta counts.

use chrono::{DateTime, Utc};
use cm_adapters::{DiaryExtractor, HistoryAdapter, HistoryError, Validator};
use cm_core::similarity::find_similar_bullet;
use cm_core::{
    Config, DiaryEntry, NewBullet, Playbook, PlaybookDelta, Sanitizer, SessionMeta,
};
use cm_storage::{save_diary, DataRoot, PlaybookStore, ProcessedEntry, ProcessedLog, StoreError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::curator::curate;
use crate::gate::evaluate_gate;

#[derive(Debug, Error)]
pub enum ReflectError {
    #[error("history tool failed: {0}")]
    History(#[from] HistoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to persist reflection state: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for one reflection cycle.
#[derive(Debug, Clone)]
pub struct ReflectOptions {
    /// Timeline lookback window.
    pub days: u32,
    /// Compute deltas but apply nothing.
    pub dry_run: bool,
    /// Restrict discovery to one workspace and write to its processed log.
    pub workspace: Option<PathBuf>,
}

impl Default for ReflectOptions {
    fn default() -> Self {
        Self { days: 7, dry_run: false, workspace: None }
    }
}

/// Per-session result inside a cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub session_path: String,
    pub deltas_proposed: u32,
    pub deltas_applied: u32,
    pub gate_rejected: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What one reflection cycle did.
#[derive(Debug, Default, Serialize)]
pub struct ReflectionSummary {
    pub sessions_seen: u32,
    pub sessions_processed: u32,
    pub deltas_proposed: u32,
    pub deltas_applied: u32,
    pub gate_rejected: u32,
    pub sessions: Vec<SessionOutcome>,
}

/// Drives discover → diary → deltas → gate → curate.
pub struct Reflector<'a> {
    pub history: &'a dyn HistoryAdapter,
    pub extractor: &'a dyn DiaryExtractor,
    /// Absent validator means ambiguous gate outcomes are skipped.
    pub validator: Option<&'a dyn Validator>,
    pub store: &'a PlaybookStore,
    pub data_root: &'a DataRoot,
    pub config: &'a Config,
}

impl<'a> Reflector<'a> {
    /// Run one reflection cycle.
    pub async fn run(
        &self,
        opts: &ReflectOptions,
        now: DateTime<Utc>,
    ) -> Result<ReflectionSummary, ReflectError> {
        let mut summary = ReflectionSummary::default();

        // 1. Discover candidate sessions from the timeline
        let groups = self.history.timeline(opts.days).await?;
        let mut processed =
            ProcessedLog::load(self.data_root.processed_log_path(opts.workspace.as_deref()));

        let mut sessions: Vec<SessionMeta> = Vec::new();
        for group in groups {
            for session in group.sessions {
                if processed.contains(&session.path) {
                    continue;
                }
                sessions.push(SessionMeta {
                    session_path: session.path,
                    agent: Some(session.agent),
                    workspace: opts
                        .workspace
                        .as_ref()
                        .map(|w| w.to_string_lossy().into_owned()),
                });
            }
        }
        summary.sessions_seen = sessions.len() as u32;
        info!(sessions = sessions.len(), days = opts.days, "reflection discovery");

        // 2. Process each session independently
        for meta in sessions {
            let outcome = self
                .process_session(&meta, &mut processed, opts, now)
                .await;
            match outcome {
                Ok(session) => {
                    summary.sessions_processed += 1;
                    summary.deltas_proposed += session.deltas_proposed;
                    summary.deltas_applied += session.deltas_applied;
                    summary.gate_rejected += session.gate_rejected;
                    summary.sessions.push(session);
                }
                Err(e) => {
                    warn!(session = %meta.session_path, error = %e, "session reflection failed");
                    summary.sessions.push(SessionOutcome {
                        session_path: meta.session_path.clone(),
                        deltas_proposed: 0,
                        deltas_applied: 0,
                        gate_rejected: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        // 3. Bump playbook totals once per cycle
        if !opts.dry_run && summary.sessions_processed > 0 {
            let processed_count = summary.sessions_processed;
            self.store.mutate_global(now, |pb| {
                pb.metadata.total_reflections += 1;
                pb.metadata.total_sessions_processed += processed_count;
            })?;
        }

        info!(
            processed = summary.sessions_processed,
            proposed = summary.deltas_proposed,
            applied = summary.deltas_applied,
            "reflection cycle complete"
        );
        Ok(summary)
    }

    async fn process_session(
        &self,
        meta: &SessionMeta,
        processed: &mut ProcessedLog,
        opts: &ReflectOptions,
        now: DateTime<Utc>,
    ) -> Result<SessionOutcome, ReflectError> {
        // Export and sanitize the transcript
        let transcript = match self.history.export_session(&meta.session_path).await? {
            Some(text) => text,
            None => {
                debug!(session = %meta.session_path, "transcript gone; skipping");
                return Ok(SessionOutcome {
                    session_path: meta.session_path.clone(),
                    deltas_proposed: 0,
                    deltas_applied: 0,
                    gate_rejected: 0,
                    error: None,
                });
            }
        };
        let sanitizer = Sanitizer::new(&self.config.sanitization);
        let clean = sanitizer.sanitize(&transcript);

        // Extract and persist the diary
        let diary = match self.extractor.extract(&clean, meta).await {
            Ok(diary) => diary,
            Err(e) => {
                return Ok(SessionOutcome {
                    session_path: meta.session_path.clone(),
                    deltas_proposed: 0,
                    deltas_applied: 0,
                    gate_rejected: 0,
                    error: Some(format!("diary extraction failed: {}", e)),
                })
            }
        };
        if !opts.dry_run {
            save_diary(&self.data_root.diary_dir(), &meta.session_path, &diary)?;
        }

        // Derive deltas from the diary against the current merged view
        let merged = self.store.load_merged()?;
        let mut deltas = derive_deltas(&diary, &merged, meta, self.config);
        let proposed = deltas.len() as u32;

        // Gate every proposed add
        let (kept, gate_rejected) = self.gate_deltas(deltas).await;
        deltas = kept;
        if gate_rejected > 0 {
            debug!(session = %meta.session_path, gate_rejected, "gate dropped adds");
        }

        if opts.dry_run {
            return Ok(SessionOutcome {
                session_path: meta.session_path.clone(),
                deltas_proposed: proposed,
                deltas_applied: 0,
                gate_rejected,
                error: None,
            });
        }

        // Crash-safe ordering: mark the session processed before curating
        processed.record(ProcessedEntry {
            id: None,
            session_path: meta.session_path.clone(),
            processed_at: now,
            deltas_proposed: proposed,
            deltas_applied: 0,
        });
        processed.save()?;

        // Apply under the playbook lock
        let applied = self.store.mutate_global(now, |pb| {
            curate(pb, deltas, self.config, now).applied
        })?;

        processed.record(ProcessedEntry {
            id: None,
            session_path: meta.session_path.clone(),
            processed_at: now,
            deltas_proposed: proposed,
            deltas_applied: applied,
        });
        processed.save()?;

        Ok(SessionOutcome {
            session_path: meta.session_path.clone(),
            deltas_proposed: proposed,
            deltas_applied: applied,
            gate_rejected,
            error: None,
        })
    }

    /// Filter `Add` deltas through the evidence gate (and validator when the
    /// gate is ambiguous). Non-add deltas pass through untouched.
    async fn gate_deltas(&self, deltas: Vec<PlaybookDelta>) -> (Vec<PlaybookDelta>, u32) {
        let mut rejected = 0u32;
        let mut kept = Vec::with_capacity(deltas.len());
        for delta in deltas {
            match delta {
                PlaybookDelta::Add { mut bullet, source_session } => {
                    let decision =
                        evaluate_gate(self.history, self.config, &bullet.content).await;
                    if !decision.passed {
                        debug!(reason = %decision.reason, "gate auto-rejected add");
                        rejected += 1;
                        continue;
                    }
                    if decision.needs_validator() {
                        match self.validator {
                            Some(validator) if self.config.validation_enabled() => {
                                let evidence = format!(
                                    "{} sessions, {} success, {} failure",
                                    decision.session_count,
                                    decision.success_count,
                                    decision.failure_count
                                );
                                match validator.validate(&bullet.content, &evidence).await {
                                    Ok(verdict) if verdict.clone().normalized().accepts() => {}
                                    Ok(_) => {
                                        rejected += 1;
                                        continue;
                                    }
                                    Err(e) => {
                                        // Ambiguous + unreachable validator:
                                        // skip rather than guess
                                        debug!(error = %e, "validator_unavailable; skipping add");
                                        rejected += 1;
                                        continue;
                                    }
                                }
                            }
                            _ => {
                                debug!("validator_unavailable; skipping ambiguous add");
                                rejected += 1;
                                continue;
                            }
                        }
                    }
                    // Auto-accepted adds skip draft and go straight to active
                    if decision.suggested_state == cm_core::BulletState::Active {
                        bullet.state = Some(cm_core::BulletState::Active);
                    }
                    kept.push(PlaybookDelta::Add { bullet, source_session });
                }
                other => kept.push(other),
            }
        }
        (kept, rejected)
    }
}

/// Turn a diary into proposed deltas against the current playbook view.
fn derive_deltas(
    diary: &DiaryEntry,
    playbook: &Playbook,
    meta: &SessionMeta,
    config: &Config,
) -> Vec<PlaybookDelta> {
    let mut deltas = Vec::new();
    let threshold = config.dedup_similarity_threshold();

    // Key learnings and decisions become candidate rules
    for learning in diary.key_learnings.iter().chain(diary.decisions.iter()) {
        deltas.push(PlaybookDelta::Add {
            bullet: NewBullet {
                content: learning.clone(),
                category: "workflow".to_string(),
                tags: diary.tags.clone(),
                ..Default::default()
            },
            source_session: Some(meta.session_path.clone()),
        });
    }

    // Preferences become preference bullets
    for preference in &diary.preferences {
        deltas.push(PlaybookDelta::Add {
            bullet: NewBullet {
                content: preference.clone(),
                category: "preference".to_string(),
                kind: Some(cm_core::BulletKind::Preference),
                tags: diary.tags.clone(),
                ..Default::default()
            },
            source_session: Some(meta.session_path.clone()),
        });
    }

    // A challenge that closely matches an existing rule is harmful evidence
    // against that rule
    for challenge in &diary.challenges {
        if let Some((bullet, score)) =
            find_similar_bullet(&playbook.bullets, challenge, threshold * 0.7)
        {
            debug!(bullet_id = %bullet.id, score, "challenge matches existing bullet");
            deltas.push(PlaybookDelta::Harmful {
                bullet_id: bullet.id.to_string(),
                reason: Some(challenge.clone()),
                context: Some("reported as a challenge during reflection".to_string()),
                source_session: Some(meta.session_path.clone()),
            });
        }
    }

    deltas
}

#[cfg(test)]
#[path = "reflect_tests.rs"]
mod tests;
