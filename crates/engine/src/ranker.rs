// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context ranker: selects the bullets and history most relevant to a task.

use cm_adapters::{HistoryAdapter, HistoryError, HistoryHit, SearchOpts};
use cm_core::scoring::effective_score;
use cm_core::similarity::{cosine, extract_keywords};
use cm_core::{Bullet, Config, Maturity};
use cm_storage::{EmbeddingCache, PlaybookStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Optional hook turning text into an embedding vector. The core never runs
/// a model; callers may plug one in.
pub type EmbeddingHook<'a> = &'a dyn Fn(&str) -> Vec<f32>;

/// Query-time options.
#[derive(Default)]
pub struct ContextOptions<'a> {
    pub workspace: Option<String>,
    /// Embedding cache + hook; both present enables cosine relevance.
    pub embeddings: Option<&'a EmbeddingCache>,
    pub embed: Option<EmbeddingHook<'a>>,
}

/// One ranked bullet in the briefing.
#[derive(Debug, Clone, Serialize)]
pub struct RankedBullet {
    pub id: String,
    pub content: String,
    pub category: String,
    pub maturity: Maturity,
    pub pinned: bool,
    pub score: f64,
}

/// A deprecated-pattern warning that matched the task or its history.
#[derive(Debug, Clone, Serialize)]
pub struct DeprecatedWarning {
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

/// The ranked briefing for one task.
#[derive(Debug, Serialize)]
pub struct ContextResult {
    pub task: String,
    pub relevant_bullets: Vec<RankedBullet>,
    pub anti_patterns: Vec<RankedBullet>,
    pub history_snippets: Vec<HistoryHit>,
    pub deprecated_warnings: Vec<DeprecatedWarning>,
    pub suggested_history_queries: Vec<String>,
    /// Set when the history tool could not be reached; snippets are empty.
    pub history_unavailable: bool,
}

/// Keyword-overlap relevance of one bullet against the task keywords.
fn keyword_relevance(bullet: &Bullet, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let content = bullet.content.to_lowercase();
    let mut hits = 0usize;
    for kw in keywords {
        if content.contains(kw) {
            hits += 1;
        } else if bullet.tags.iter().any(|t| t.eq_ignore_ascii_case(kw)) {
            hits += 1;
        }
    }
    hits as f64 / keywords.len() as f64
}

/// Build the context briefing for `task`.
pub async fn build_context(
    store: &PlaybookStore,
    history: &dyn HistoryAdapter,
    config: &Config,
    task: &str,
    opts: ContextOptions<'_>,
    now: DateTime<Utc>,
) -> Result<ContextResult, StoreError> {
    let playbook = store.load_merged()?;
    let keywords = extract_keywords(task, 8);
    let task_embedding = match (&opts.embed, config.semantic_search_enabled()) {
        (Some(embed), true) => Some(embed(task)),
        _ => None,
    };

    // Score active, workspace-visible bullets
    let mut scored: Vec<(&Bullet, f64)> = Vec::new();
    for bullet in playbook.bullets_for_workspace(opts.workspace.as_deref()) {
        let relevance = match (&task_embedding, opts.embeddings) {
            (Some(task_vec), Some(cache)) => {
                let stored = bullet
                    .embedding
                    .as_deref()
                    .or_else(|| cache.get(bullet.id.as_str()));
                match stored {
                    Some(vec) if !vec.is_empty() => cosine(task_vec, vec),
                    _ => keyword_relevance(bullet, &keywords),
                }
            }
            _ => keyword_relevance(bullet, &keywords),
        };
        // Mildly negative or zero effective scores still allow ranking
        let weight = effective_score(bullet, now, &config.scoring).max(0.1);
        let score = relevance * weight;
        if score > 0.0 {
            scored.push((bullet, score));
        }
    }
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(config.context.max_bullets_in_context);

    let mut relevant_bullets = Vec::new();
    let mut anti_patterns = Vec::new();
    for (bullet, score) in &scored {
        let ranked = RankedBullet {
            id: bullet.id.to_string(),
            content: bullet.content.clone(),
            category: bullet.category.clone(),
            maturity: bullet.maturity,
            pinned: bullet.pinned,
            score: *score,
        };
        if bullet.is_anti_pattern() {
            anti_patterns.push(ranked);
        } else {
            relevant_bullets.push(ranked);
        }
    }

    // Historical snippets for the top keywords
    let query = keywords.iter().take(4).cloned().collect::<Vec<_>>().join(" ");
    let (history_snippets, history_unavailable) = if query.is_empty() {
        (Vec::new(), false)
    } else {
        let search = history
            .search(
                &query,
                &SearchOpts {
                    limit: config.context.max_history_in_context,
                    days: config.context.session_lookback_days,
                    agent: None,
                    workspace: opts.workspace.clone(),
                },
            )
            .await;
        match search {
            Ok(hits) => (hits, false),
            Err(HistoryError::Unavailable) | Err(HistoryError::Timeout) => (Vec::new(), true),
            Err(e) => {
                debug!(error = %e, "history search failed");
                (Vec::new(), true)
            }
        }
    };

    // Deprecated-pattern warnings against the task and the snippets
    let mut deprecated_warnings = Vec::new();
    let mut warned: HashSet<&str> = HashSet::new();
    for pattern in &playbook.deprecated_patterns {
        let hit = pattern.matches(task)
            || history_snippets.iter().any(|s| pattern.matches(&s.snippet));
        if hit && warned.insert(pattern.pattern.as_str()) {
            deprecated_warnings.push(DeprecatedWarning {
                pattern: pattern.pattern.clone(),
                reason: pattern.reason.clone(),
                replacement: pattern.replacement.clone(),
            });
        }
    }

    let suggested_history_queries = suggest_queries(&keywords, &relevant_bullets);

    Ok(ContextResult {
        task: task.to_string(),
        relevant_bullets,
        anti_patterns,
        history_snippets,
        deprecated_warnings,
        suggested_history_queries,
        history_unavailable,
    })
}

/// A few follow-up queries the caller can run by hand.
fn suggest_queries(keywords: &[String], top: &[RankedBullet]) -> Vec<String> {
    let mut suggestions = Vec::new();
    if keywords.len() >= 2 {
        suggestions.push(keywords[..2.min(keywords.len())].join(" "));
    }
    if let Some(kw) = keywords.first() {
        suggestions.push(format!("error {}", kw));
        if let Some(best) = top.first() {
            suggestions.push(format!("{} {}", best.category, kw));
        }
    }
    suggestions.dedup();
    suggestions
}

#[cfg(test)]
#[path = "ranker_tests.rs"]
mod tests;
